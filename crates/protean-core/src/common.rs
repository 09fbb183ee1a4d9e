//! Common-type resolution
//!
//! Computes, for a pair of tags, the tag both can be converted into before
//! a heterogeneous binary operation dispatches homogeneously. The relation
//! is partial and symmetric; author-declared mappings are stored in both
//! directions, and the structural constant rules are symmetric by
//! construction.

use crate::error::{DispatchError, Result};
use crate::registry::Registry;
use crate::tag::Tag;
use tracing::debug;

impl Registry {
    /// Resolve the common tag of a pair.
    ///
    /// Order of precedence:
    /// 1. identical tags;
    /// 2. an author-declared mapping;
    /// 3. both constants: common of the underlyings, staying inside the
    ///    wrapper family when both sides share it, falling back to the
    ///    canonical wrapper when they do not;
    /// 4. one constant: unwrap it and recurse;
    /// 5. no common tag.
    pub fn common(&self, a: &Tag, b: &Tag) -> Result<Tag> {
        let result = self.common_inner(a, b);
        match &result {
            Ok(c) => debug!(lhs = %a, rhs = %b, common = %c, "common tag"),
            Err(_) => debug!(lhs = %a, rhs = %b, "no common tag"),
        }
        result
    }

    fn common_inner(&self, a: &Tag, b: &Tag) -> Result<Tag> {
        if a == b {
            return Ok(a.clone());
        }
        if let Some(declared) = self.commons.get(&(a.clone(), b.clone())) {
            return Ok(declared.clone());
        }
        let no_common = || DispatchError::NoCommonType {
            lhs: a.clone(),
            rhs: b.clone(),
        };
        match (a, b) {
            (
                Tag::Constant { wrapper: wa, underlying: ua },
                Tag::Constant { wrapper: wb, underlying: ub },
            ) => {
                let under = self.common_inner(ua, ub).map_err(|_| no_common())?;
                if wa == wb {
                    // Same wrapper family: stay inside it rather than
                    // downgrading to the canonical representation
                    Ok(Tag::constant(wa.clone(), under))
                } else {
                    Ok(Tag::canonical(under))
                }
            }
            (Tag::Constant { underlying, .. }, plain) => {
                self.common_inner(underlying, plain).map_err(|_| no_common())
            }
            (plain, Tag::Constant { underlying, .. }) => {
                self.common_inner(plain, underlying).map_err(|_| no_common())
            }
            _ => Err(no_common()),
        }
    }

    /// Whether a common tag exists for the pair
    pub fn has_common(&self, a: &Tag, b: &Tag) -> bool {
        self.common_inner(a, b).is_ok()
    }
}
