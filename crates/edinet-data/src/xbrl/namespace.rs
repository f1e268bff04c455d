//! Selection of the taxonomy namespaces facts are read from.

use super::filename::FilenameMetadata;

/// Document and entity information taxonomy
pub const DEI_PREFIX: &str = "jpdei_cor";

/// Japanese GAAP financial statement taxonomy
pub const PFS_PREFIX: &str = "jppfs_cor";

/// A namespace declared by the instance and selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetNamespace {
    /// Prefix as declared on the instance root
    pub prefix: String,
    /// Namespace URI
    pub uri: String,
}

/// Candidate prefixes for an instance, in extraction order.
pub fn candidate_prefixes(meta: &FilenameMetadata) -> Vec<String> {
    vec![
        DEI_PREFIX.to_string(),
        meta.document_namespace_prefix(),
        format!("jp{}_cor", meta.cabinet_order_code),
        // Some taxonomies carry the report code in the ordinance prefix
        format!("jp{}-{}_cor", meta.cabinet_order_code, meta.report_code),
        PFS_PREFIX.to_string(),
    ]
}

/// Keep the candidates the instance actually declares.
///
/// `declared` holds `(prefix, uri)` pairs from the root element. The result
/// follows candidate order, without duplicates.
pub fn select_namespaces(
    candidates: &[String],
    declared: &[(String, String)],
) -> Vec<TargetNamespace> {
    let mut selected: Vec<TargetNamespace> = Vec::new();
    for candidate in candidates {
        if selected.iter().any(|t| &t.prefix == candidate) {
            continue;
        }
        if let Some((prefix, uri)) = declared.iter().find(|(p, _)| p == candidate) {
            selected.push(TargetNamespace {
                prefix: prefix.clone(),
                uri: uri.clone(),
            });
        }
    }
    selected
}
