//! State Store: the key-value surface the host must provide
use crate::error::StoreError;

/// Transactional key-value access for one unit of work.
///
/// Keys are plain strings ordered lexicographically. Writes become visible
/// to other units of work only when the host commits.
pub trait StateStore {
    /// Read a value, `None` when the key is absent
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Half-open scan over `[start, end)` in key order.
    ///
    /// An empty `end` means "up to the end of the key space".
    fn range_scan(&self, start: &str, end: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    fn contains_key(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get_state(key)?.is_some())
    }
}

/// Exclusive upper bound covering every key that starts with `prefix`.
pub fn prefix_end(prefix: &str) -> String {
    let mut bytes = prefix.as_bytes().to_vec();
    while let Some(last) = bytes.pop() {
        if last < 0x7f {
            bytes.push(last + 1);
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_end() {
        assert_eq!(prefix_end("record:"), "record;");
        assert_eq!(prefix_end("alert:S1:"), "alert:S1;");
        assert_eq!(prefix_end(""), "");
    }
}
