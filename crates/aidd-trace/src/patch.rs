//! In-place field patching
//!
//! Re-locates the node owning a placeholder and rewrites exactly one field.
//! Everything else in the tree is left untouched.
//!
//! # Matching
//! - With an owning context, a mapping matches when one of its own-identifier
//!   keys holds that identifier.
//! - Without one, only the document root matches.
//!
//! The search is pre-order and depth-first. At a matching node the field is
//! patched directly if present, else inside its `related` sub-mapping; if
//! neither holds the field the search moves on to the next matching node.
//! Identifier uniqueness is assumed, not verified: when several nodes could
//! take the patch only the first is changed and the outcome says so.

use crate::placeholder::PlaceholderEntry;
use aidd_artifact::fields::{OWN_ID_KEYS, RELATED_KEY};
use aidd_artifact::{DocumentValue, Identifier, Mapping};
use std::path::PathBuf;

/// Instruction to set one field of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// File to rewrite
    pub file: PathBuf,
    /// Owning context; `None` targets the document root
    pub context: Option<Identifier>,
    /// Key to rewrite
    pub field: String,
    /// Replacement value
    pub new_value: DocumentValue,
}

impl Patch {
    /// Patch resolving `entry` to a single identifier
    #[must_use]
    pub fn resolve(entry: &PlaceholderEntry, target: &Identifier) -> Self {
        Self {
            file: entry.source.clone(),
            context: entry.context_id.clone(),
            field: entry.field.clone(),
            new_value: DocumentValue::from(target),
        }
    }
}

/// Where the field was found relative to the matching node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchLocation {
    /// Directly on the matching node
    Direct,
    /// Inside the node's `related` sub-mapping
    Related,
}

/// Result of a successful patch
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOutcome {
    /// Where the field was rewritten
    pub location: PatchLocation,
    /// Value before the patch
    pub previous: DocumentValue,
    /// Nodes that could have taken the patch; above one means ambiguous
    pub candidates: usize,
    /// The context search failed and the document root was used instead
    pub root_fallback: bool,
}

impl PatchOutcome {
    /// More than one node could have taken the patch
    #[inline]
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }

    /// The new value equals the old one
    #[must_use]
    pub fn is_noop(&self, patch: &Patch) -> bool {
        self.previous == patch.new_value
    }
}

/// Patch failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// No matching node holds the field
    #[error("field '{field}' not found for context '{context}'")]
    FieldNotFound {
        /// Owning context searched for (empty = document root)
        context: String,
        /// Field searched for
        field: String,
    },
}

/// Apply `patch` to a freshly parsed tree
///
/// # Errors
/// Returns [`PatchError::FieldNotFound`] if no matching node holds the
/// field, in which case the tree is unchanged and must not be written.
pub fn apply_patch(root: &mut DocumentValue, patch: &Patch) -> Result<PatchOutcome, PatchError> {
    let context = patch.context.as_ref().map(Identifier::as_str);
    let field = patch.field.as_str();

    let candidates = count_candidates(root, context, true, field);
    if let Some((location, previous)) = patch_first(root, context, true, field, &patch.new_value) {
        if candidates > 1 {
            tracing::warn!(
                file = %patch.file.display(),
                context = context.unwrap_or_default(),
                field,
                candidates,
                "ambiguous patch target; only the first match was changed"
            );
        }
        return Ok(PatchOutcome {
            location,
            previous,
            candidates,
            root_fallback: false,
        });
    }

    // Flat documents: the context may be declared somewhere the field is not.
    if context.is_some() {
        if let Some((location, previous)) = patch_first(root, None, true, field, &patch.new_value) {
            tracing::warn!(
                file = %patch.file.display(),
                context = context.unwrap_or_default(),
                field,
                "context not found; patched the root-level field"
            );
            return Ok(PatchOutcome {
                location,
                previous,
                candidates: 1,
                root_fallback: true,
            });
        }
    }

    Err(PatchError::FieldNotFound {
        context: context.unwrap_or_default().to_string(),
        field: field.to_string(),
    })
}

fn node_matches(map: &Mapping, context: Option<&str>, is_root: bool) -> bool {
    match context {
        Some(ctx) => OWN_ID_KEYS
            .iter()
            .any(|key| map.get(*key).and_then(DocumentValue::as_str).is_some_and(|v| v.trim() == ctx)),
        None => is_root,
    }
}

fn locate(map: &Mapping, field: &str) -> Option<PatchLocation> {
    if map.contains_key(field) {
        return Some(PatchLocation::Direct);
    }
    match map.get(RELATED_KEY).and_then(DocumentValue::as_mapping) {
        Some(related) if related.contains_key(field) => Some(PatchLocation::Related),
        _ => None,
    }
}

fn count_candidates(node: &DocumentValue, context: Option<&str>, is_root: bool, field: &str) -> usize {
    match node {
        DocumentValue::Mapping(map) => {
            let here = usize::from(node_matches(map, context, is_root) && locate(map, field).is_some());
            if context.is_none() {
                return here;
            }
            here + map
                .values()
                .map(|child| count_candidates(child, context, false, field))
                .sum::<usize>()
        }
        DocumentValue::Sequence(items) => items
            .iter()
            .map(|item| count_candidates(item, context, false, field))
            .sum(),
        DocumentValue::Tagged(tagged) => count_candidates(&tagged.value, context, is_root, field),
        DocumentValue::Scalar(_) => 0,
    }
}

fn patch_first(
    node: &mut DocumentValue,
    context: Option<&str>,
    is_root: bool,
    field: &str,
    new_value: &DocumentValue,
) -> Option<(PatchLocation, DocumentValue)> {
    match node {
        DocumentValue::Mapping(map) => {
            if node_matches(map, context, is_root) {
                match locate(map, field) {
                    Some(PatchLocation::Direct) => {
                        let slot = map.get_mut(field)?;
                        let previous = std::mem::replace(slot, new_value.clone());
                        return Some((PatchLocation::Direct, previous));
                    }
                    Some(PatchLocation::Related) => {
                        let slot = map
                            .get_mut(RELATED_KEY)
                            .and_then(DocumentValue::as_mapping_mut)
                            .and_then(|related| related.get_mut(field))?;
                        let previous = std::mem::replace(slot, new_value.clone());
                        return Some((PatchLocation::Related, previous));
                    }
                    None => {}
                }
            }
            if context.is_none() {
                return None;
            }
            map.values_mut()
                .find_map(|child| patch_first(child, context, false, field, new_value))
        }
        DocumentValue::Sequence(items) => items
            .iter_mut()
            .find_map(|item| patch_first(item, context, false, field, new_value)),
        DocumentValue::Tagged(tagged) => {
            patch_first(&mut tagged.value, context, is_root, field, new_value)
        }
        DocumentValue::Scalar(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::find_placeholders;
    use crate::reference::extract_references;
    use crate::test_support::{doc, yaml};
    use aidd_artifact::{Document, ReferenceDirection};
    use pretty_assertions::assert_eq;

    fn patch(context: Option<&str>, field: &str, value: &str) -> Patch {
        Patch {
            file: PathBuf::from("t.yaml"),
            context: context.map(|c| Identifier::parse(c).unwrap()),
            field: field.to_string(),
            new_value: DocumentValue::from(value),
        }
    }

    #[test]
    fn patches_root_field_and_leaves_the_rest() {
        let mut tree = yaml(
            r"
id: REQ-REQ-ITEM-001
title: Login
derived_from: PENDING
tags: [auth, ui]
",
        );
        let mut expected = tree.clone();
        expected
            .as_mapping_mut()
            .unwrap()
            .insert("derived_from".into(), "PLN-PLN-GOAL-001".into());

        let outcome = apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derived_from", "PLN-PLN-GOAL-001"),
        )
        .unwrap();

        assert_eq!(tree, expected);
        assert_eq!(outcome.location, PatchLocation::Direct);
        assert_eq!(outcome.previous, DocumentValue::from("PENDING"));
        assert!(!outcome.is_ambiguous());
        assert!(!outcome.root_fallback);
    }

    /// Untouched fields keep their key types and tags on write-back
    #[test]
    fn patch_keeps_key_types_and_tags() {
        let src = r"
id: REQ-REQ-ITEM-001
derived_from: PENDING
versions:
  1: first
  2: second
flags:
  true: on
kind: !custom widget
";
        let mut expected: serde_yaml::Value = serde_yaml::from_str(src).unwrap();
        expected["derived_from"] = serde_yaml::Value::from("PLN-PLN-GOAL-001");

        let mut tree = yaml(src);
        apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derived_from", "PLN-PLN-GOAL-001"),
        )
        .unwrap();

        assert_eq!(tree.to_yaml(), expected);
    }

    #[test]
    fn patches_inside_tagged_nodes() {
        let src = "items: !list\n  - id: REQ-REQ-ITEM-001\n    derived_from: PENDING\n";
        assert_eq!(find_placeholders(&[doc("t.yaml", src)]).len(), 1);

        let mut tree = yaml(src);
        apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derived_from", "PLN-PLN-GOAL-001"),
        )
        .unwrap();

        let expected: serde_yaml::Value = serde_yaml::from_str(
            "items: !list\n  - id: REQ-REQ-ITEM-001\n    derived_from: PLN-PLN-GOAL-001\n",
        )
        .unwrap();
        assert_eq!(tree.to_yaml(), expected);
    }

    #[test]
    fn patches_the_node_owning_the_context() {
        let mut tree = yaml(
            r"
doc_id: REQ-REQ-DOC-001
items:
  - id: REQ-REQ-ITEM-001
    derived_from: PENDING
  - id: REQ-REQ-ITEM-002
    derived_from: PENDING
",
        );
        apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-002"), "derived_from", "PLN-PLN-GOAL-002"),
        )
        .unwrap();

        let items = match tree.get("items") {
            Some(DocumentValue::Sequence(items)) => items,
            other => panic!("unexpected items: {other:?}"),
        };
        assert_eq!(items[0].get("derived_from"), Some(&DocumentValue::from("PENDING")));
        assert_eq!(items[1].get("derived_from"), Some(&DocumentValue::from("PLN-PLN-GOAL-002")));
    }

    #[test]
    fn falls_back_to_related_group() {
        let mut tree = yaml(
            r"
id: REQ-REQ-ITEM-001
related:
  derivedfrom: PENDING
  traces_to: DES-DES-MOD-001
",
        );
        let outcome = apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derivedfrom", "PLN-PLN-GOAL-001"),
        )
        .unwrap();
        assert_eq!(outcome.location, PatchLocation::Related);
        let related = tree.get("related").unwrap();
        assert_eq!(related.get("derivedfrom"), Some(&DocumentValue::from("PLN-PLN-GOAL-001")));
        assert_eq!(related.get("traces_to"), Some(&DocumentValue::from("DES-DES-MOD-001")));
    }

    #[test]
    fn continues_past_matching_node_without_the_field() {
        let mut tree = yaml(
            r"
summary:
  id: REQ-REQ-ITEM-001
  title: mention only
detail:
  id: REQ-REQ-ITEM-001
  derived_from: PENDING
",
        );
        let outcome = apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derived_from", "PLN-PLN-GOAL-001"),
        )
        .unwrap();
        assert_eq!(outcome.candidates, 1);
        assert_eq!(
            tree.get("detail").and_then(|d| d.get("derived_from")),
            Some(&DocumentValue::from("PLN-PLN-GOAL-001"))
        );
    }

    #[test]
    fn duplicate_context_patches_first_and_reports_ambiguity() {
        let mut tree = yaml(
            r"
- id: REQ-REQ-ITEM-001
  derived_from: PENDING
- id: REQ-REQ-ITEM-001
  derived_from: PENDING
",
        );
        let outcome = apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derived_from", "PLN-PLN-GOAL-001"),
        )
        .unwrap();
        assert!(outcome.is_ambiguous());
        assert_eq!(outcome.candidates, 2);

        let DocumentValue::Sequence(items) = &tree else {
            panic!("root should stay a sequence");
        };
        assert_eq!(items[0].get("derived_from"), Some(&DocumentValue::from("PLN-PLN-GOAL-001")));
        assert_eq!(items[1].get("derived_from"), Some(&DocumentValue::from("PENDING")));
    }

    #[test]
    fn empty_context_only_matches_root() {
        let mut tree = yaml("derived_from: PENDING\nchild:\n  derived_from: PENDING\n");
        apply_patch(&mut tree, &patch(None, "derived_from", "PLN-PLN-GOAL-001")).unwrap();
        assert_eq!(tree.get("derived_from"), Some(&DocumentValue::from("PLN-PLN-GOAL-001")));
        assert_eq!(
            tree.get("child").and_then(|c| c.get("derived_from")),
            Some(&DocumentValue::from("PENDING"))
        );

        let mut nested_only = yaml("items:\n  - derived_from: PENDING\n");
        let before = nested_only.clone();
        let err = apply_patch(&mut nested_only, &patch(None, "derived_from", "PLN-PLN-GOAL-001"))
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::FieldNotFound {
                context: String::new(),
                field: "derived_from".into()
            }
        );
        assert_eq!(nested_only, before);
    }

    #[test]
    fn unknown_context_falls_back_to_root_field() {
        let mut tree = yaml("derived_from: PENDING\n");
        let outcome = apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-GONE-001"), "derived_from", "PLN-PLN-GOAL-001"),
        )
        .unwrap();
        assert!(outcome.root_fallback);
        assert_eq!(tree.get("derived_from"), Some(&DocumentValue::from("PLN-PLN-GOAL-001")));
    }

    #[test]
    fn missing_field_leaves_tree_unchanged() {
        let mut tree = yaml("id: REQ-REQ-ITEM-001\ntitle: x\n");
        let before = tree.clone();
        let result = apply_patch(
            &mut tree,
            &patch(Some("REQ-REQ-ITEM-001"), "derived_from", "PLN-PLN-GOAL-001"),
        );
        assert!(result.is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn patched_placeholder_becomes_upstream_reference() {
        let mut d: Document = doc(
            "B.yaml",
            "id: REQ-REQ-ITEM-001\nderived_from: [PENDING, PENDING]\n",
        );
        let entry = find_placeholders(std::slice::from_ref(&d)).remove(0);
        let target = Identifier::parse("PLN-PLN-GOAL-001").unwrap();
        let p = Patch::resolve(&entry, &target);
        apply_patch(&mut d.root, &p).unwrap();

        let corpus = [d];
        assert!(find_placeholders(&corpus).is_empty());
        let refs = extract_references(&corpus);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source_id_str(), "REQ-REQ-ITEM-001");
        assert_eq!(refs[0].field, "derived_from");
        assert_eq!(refs[0].target, target);
        assert_eq!(refs[0].direction, ReferenceDirection::Upstream);
    }

    #[test]
    fn noop_detection() {
        let mut tree = yaml("derived_from: PLN-PLN-GOAL-001\n");
        let p = patch(None, "derived_from", "PLN-PLN-GOAL-001");
        let outcome = apply_patch(&mut tree, &p).unwrap();
        assert!(outcome.is_noop(&p));
    }
}
