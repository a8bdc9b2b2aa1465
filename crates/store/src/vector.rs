//! Vector similarity utilities.

use pipewright_core::document::Document;
use pipewright_core::error::StoreError;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |acc, (x, y)| {
        let (x, y) = (*x as f64, *y as f64);
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank documents by cosine similarity to `query`.
///
/// Documents without an embedding are skipped. A stored embedding whose
/// length differs from the query is an error. Ties keep insertion order.
pub fn rank_by_similarity(
    documents: &[Document],
    query: &[f32],
    top_k: usize,
) -> Result<Vec<Document>, StoreError> {
    let mut scored = Vec::new();

    for doc in documents {
        let Some(embedding) = doc.embedding.as_ref() else {
            continue;
        };
        if embedding.len() != query.len() {
            return Err(StoreError::DimensionMismatch {
                expected: query.len(),
                actual: embedding.len(),
            });
        }
        let mut hit = doc.clone();
        hit.score = Some(cosine_similarity(embedding, query));
        scored.push(hit);
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str, embedding: Option<Vec<f32>>) -> Document {
        let mut d = Document::new(text);
        d.embedding = embedding;
        d
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn ranks_and_scores() {
        let docs = vec![
            doc("orthogonal", Some(vec![0.0, 1.0, 0.0])),
            doc("identical", Some(vec![1.0, 0.0, 0.0])),
            doc("partial", Some(vec![0.5, 0.5, 0.0])),
            doc("unembedded", None),
        ];

        let hits = rank_by_similarity(&docs, &[1.0, 0.0, 0.0], 10).unwrap();
        let order: Vec<_> = hits.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(order, vec!["identical", "partial", "orthogonal"]);
        assert!((hits[0].score.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn respects_top_k() {
        let docs: Vec<_> = (0..10)
            .map(|i| doc(&format!("d{i}"), Some(vec![1.0, i as f32 * 0.1])))
            .collect();
        assert_eq!(rank_by_similarity(&docs, &[1.0, 0.0], 3).unwrap().len(), 3);
    }

    #[test]
    fn dimension_mismatch_is_error() {
        let docs = vec![doc("short", Some(vec![1.0]))];
        let err = rank_by_similarity(&docs, &[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch { expected: 2, actual: 1 }
        ));
    }
}
