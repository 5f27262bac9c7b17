//! Parallel Batch Parsing
//!
//! Uses Rayon to parse many independent documents at once. Each document
//! gets its own scanner and decoder; results come back in input order.

use std::path::Path;

use rayon::prelude::*;

use super::streaming::parse_path;
use crate::error::Result;
use crate::options::ParseOptions;
use crate::schema::Schema;

/// Parse in-memory documents in parallel
pub fn parse_batch<D>(documents: &[D], options: &ParseOptions) -> Vec<Result<Schema>>
where
    D: AsRef<[u8]> + Sync,
{
    documents
        .par_iter()
        .map(|document| crate::parse_schema_with(document.as_ref(), options))
        .collect()
}

/// Parse files in parallel, streaming each from disk
pub fn parse_files<P>(paths: &[P], options: &ParseOptions) -> Vec<Result<Schema>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| parse_path(path.as_ref(), options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn document(code: &str) -> String {
        format!(r#"<Model><o:Table Id="t"><a:Code>{code}</a:Code></o:Table></Model>"#)
    }

    #[test]
    fn test_batch_preserves_order() {
        let documents: Vec<String> = (0..16).map(|i| document(&format!("table_{i}"))).collect();
        let results = parse_batch(&documents, &ParseOptions::new());

        assert_eq!(results.len(), 16);
        for (i, result) in results.iter().enumerate() {
            let schema = result.as_ref().unwrap();
            assert_eq!(schema.tables()[0].code, format!("table_{i}"));
        }
    }

    #[test]
    fn test_batch_failures_are_independent() {
        let documents = [document("ok"), "<Model><o:Table".to_string()];
        let results = parse_batch(&documents, &ParseOptions::new());
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::MalformedDocument { .. })));
    }

    #[test]
    fn test_files_roundtrip_through_disk() {
        let dir = std::env::temp_dir().join(format!("rustypdm-parallel-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("first.pdm");
        std::fs::write(&first, document("first")).unwrap();
        let missing = dir.join("missing.pdm");

        let results = parse_files(&[&first, &missing], &ParseOptions::new().with_chunk_size(5));
        assert_eq!(results[0].as_ref().unwrap().tables()[0].code, "first");
        assert!(matches!(results[1], Err(Error::Io(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
