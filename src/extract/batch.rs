//! Request-size chunking for calls with an upstream per-call cap.

/// Split `items` into contiguous, order-preserving chunks of at most
/// `max_batch_size` elements each. An empty input yields no chunks.
///
/// `max_batch_size` must be at least 1.
pub fn batches<T>(items: &[T], max_batch_size: usize) -> impl Iterator<Item = &[T]> {
    debug_assert!(max_batch_size >= 1);
    items.chunks(max_batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenation_preserves_order() {
        let ids: Vec<u32> = (0..123).collect();
        let flattened: Vec<u32> = batches(&ids, 50).flatten().copied().collect();
        assert_eq!(flattened, ids);
    }

    #[test]
    fn test_chunk_sizes_and_count() {
        let ids: Vec<u32> = (0..123).collect();
        let chunks: Vec<&[u32]> = batches(&ids, 50).collect();
        assert_eq!(chunks.len(), 3); // ceil(123 / 50)
        assert_eq!(chunks[0].len(), 50);
        assert_eq!(chunks[1].len(), 50);
        assert_eq!(chunks[2].len(), 23);
        assert!(chunks.iter().all(|c| c.len() <= 50));
    }

    #[test]
    fn test_exact_multiple() {
        let ids: Vec<u32> = (0..100).collect();
        assert_eq!(batches(&ids, 50).count(), 2);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let ids: Vec<u32> = Vec::new();
        assert_eq!(batches(&ids, 50).count(), 0);
    }

    #[test]
    fn test_batch_size_one() {
        let ids = vec!["a", "b", "c"];
        let chunks: Vec<&[&str]> = batches(&ids, 1).collect();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }
}
