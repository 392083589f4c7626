//! Recipe template expansion
//!
//! Turns property-referencing templates like
//! `"${compiler.path}avr-gcc" -c ${source_file} -o ${object_file}` into
//! literal command lines. Substitution is recursive: a resolved value may
//! itself contain `${token}` placeholders, bounded by a depth limit and an
//! ancestor-chain cycle check. Expansion is all-or-nothing per template and
//! has no side effects.

use regex::Regex;
use std::sync::OnceLock;

use super::properties::PropertyTree;
use crate::error::ExpandError;

/// Default bound on nested substitution depth
pub const DEFAULT_DEPTH_LIMIT: usize = 10;

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z0-9_][A-Za-z0-9_.-]*)\}").expect("token pattern is valid")
    })
}

/// Expands `${token}` placeholders against an effective property tree.
#[derive(Debug, Clone, Copy)]
pub struct RecipeExpander<'a> {
    properties: &'a PropertyTree,
    depth_limit: usize,
}

impl<'a> RecipeExpander<'a> {
    /// Create an expander over an effective tree
    pub fn new(properties: &'a PropertyTree) -> Self {
        Self {
            properties,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Override the recursion depth limit
    #[must_use]
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Fully expand a template. A template without placeholders is
    /// returned unchanged; identical inputs always produce identical
    /// output.
    pub fn expand(&self, template: &str) -> Result<String, ExpandError> {
        let mut chain = Vec::new();
        self.expand_inner(template, &mut chain)
    }

    fn expand_inner(
        &self,
        template: &str,
        chain: &mut Vec<String>,
    ) -> Result<String, ExpandError> {
        let mut output = String::with_capacity(template.len());
        let mut last_end = 0;

        for cap in token_regex().captures_iter(template) {
            let full = cap.get(0).expect("capture 0 always present");
            let token = &cap[1];

            output.push_str(&template[last_end..full.start()]);

            if chain.iter().any(|ancestor| ancestor == token) {
                let mut cycle = chain.clone();
                cycle.push(token.to_string());
                return Err(ExpandError::CyclicReference { chain: cycle });
            }
            if chain.len() >= self.depth_limit {
                return Err(ExpandError::DepthExceeded {
                    token: token.to_string(),
                    limit: self.depth_limit,
                });
            }

            let value = self.properties.get(token).ok_or_else(|| {
                ExpandError::UnresolvedReference {
                    token: token.to_string(),
                }
            })?;

            // Resolve nested placeholders in the value before substituting
            chain.push(token.to_string());
            let resolved = self.expand_inner(value, chain)?;
            chain.pop();

            output.push_str(&resolved);
            last_end = full.end();
        }

        output.push_str(&template[last_end..]);
        Ok(output)
    }
}
