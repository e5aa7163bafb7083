// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Splits rows by position at a fixed boundary:
//
//   rows[0..train_count]  → training set
//   rows[train_count..]   → test set
//
// No shuffling and no stratification: the split depends only on
// file order, so repeated runs see exactly the same rows.
//
// A boundary at or past the end leaves the test set empty;
// a boundary of 0 leaves the training set empty. Both are
// valid and handled downstream.

/// Split `rows` at `train_count` into (train, test).
pub fn split_at_count<T>(mut rows: Vec<T>, train_count: usize) -> (Vec<T>, Vec<T>) {
    let total = rows.len();

    // Clamp to valid range so split_off never panics
    let split_at = train_count.min(total);

    // split_off(n) removes elements [n..] from the Vec and returns them
    let test = rows.split_off(split_at);

    if train_count > total {
        tracing::warn!(
            "Train count {} exceeds the {} available rows; the test set is empty",
            train_count,
            total
        );
    }
    tracing::debug!("Dataset split: {} training, {} test", rows.len(), test.len());

    (rows, test)
}

/// Split a stream of fallible rows at `train_count`.
///
/// Stops at the first error. Only rows that come out of the stream
/// count toward the boundary, so rows dropped upstream never shift it.
pub fn split_stream<T, E>(
    rows: impl IntoIterator<Item = Result<T, E>>,
    train_count: usize,
) -> Result<(Vec<T>, Vec<T>), E> {
    let rows = rows.into_iter().collect::<Result<Vec<T>, E>>()?;
    Ok(split_at_count(rows, train_count))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_split() {
        let items: Vec<usize> = (0..10).collect();
        let (train, test) = split_at_count(items, 7);
        assert_eq!(train, (0..7).collect::<Vec<_>>());
        assert_eq!(test, vec![7, 8, 9]);
    }

    #[test]
    fn test_all_items_preserved() {
        // No items should be lost in the split
        for boundary in [0, 1, 25, 49, 50, 80] {
            let items: Vec<usize> = (0..50).collect();
            let (train, test) = split_at_count(items, boundary);
            assert_eq!(train.len() + test.len(), 50);
            assert_eq!(train.len(), boundary.min(50));
        }
    }

    #[test]
    fn test_boundary_past_end_gives_empty_test() {
        let items: Vec<usize> = (0..5).collect();
        let (train, test) = split_at_count(items, 5);
        assert_eq!(train.len(), 5);
        assert!(test.is_empty());
    }

    #[test]
    fn test_zero_boundary_gives_empty_train() {
        let items: Vec<usize> = (0..5).collect();
        let (train, test) = split_at_count(items, 0);
        assert!(train.is_empty());
        assert_eq!(test, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_at_count(Vec::<usize>::new(), 3);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_stream_matches_vec_split() {
        let rows: Vec<Result<usize, String>> = (0..10).map(Ok).collect();
        let (train, test) = split_stream(rows, 7).unwrap();
        assert_eq!((train, test), split_at_count((0..10).collect(), 7));
    }

    #[test]
    fn test_stream_stops_on_error() {
        let rows = vec![Ok(1), Err("bad".to_string()), Ok(3)];
        assert_eq!(split_stream(rows, 1).unwrap_err(), "bad");
    }
}
