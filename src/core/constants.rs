// ============================================================================
// spark-mvvm - Constants
// Watcher state flags, directive markers and template delimiters
// ============================================================================

// =============================================================================
// WATCHER STATE FLAGS
// =============================================================================

/// Watcher is not evaluating
pub const IDLE: u32 = 1 << 0;

/// Watcher is evaluating its path and registering dependencies
pub const COLLECTING: u32 = 1 << 1;

/// Watcher has been disposed and ignores further notifications
pub const DISPOSED: u32 = 1 << 2;

/// Watcher has evaluated at least once
pub const WATCHER_RAN: u32 = 1 << 3;

/// Watcher was notified while its callback was running
pub const PENDING: u32 = 1 << 4;

// =============================================================================
// STATUS MASK (for clearing status bits)
// =============================================================================

/// Mask to clear the evaluation status bits (IDLE, COLLECTING)
pub const STATUS_MASK: u32 = !(IDLE | COLLECTING);

// =============================================================================
// LIMITS
// =============================================================================

/// Reruns allowed for a watcher that keeps writing its own path
pub const MAX_RERUNS: u32 = 100;

// =============================================================================
// TEMPLATE SYNTAX
// =============================================================================

/// Attribute name prefix marking a directive
pub const DIRECTIVE_PREFIX: &str = "v-";

/// Opening interpolation delimiter
pub const OPEN_DELIMITER: &str = "{{";

/// Closing interpolation delimiter
pub const CLOSE_DELIMITER: &str = "}}";

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// DOM event fired by user edits of a bound input
pub const INPUT_EVENT: &str = "input";

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct() {
        let all_flags = [IDLE, COLLECTING, DISPOSED, WATCHER_RAN, PENDING];

        for (i, &a) in all_flags.iter().enumerate() {
            for (j, &b) in all_flags.iter().enumerate() {
                if i != j {
                    assert_eq!(a & b, 0, "Flags at index {} and {} overlap", i, j);
                }
            }
        }
    }

    #[test]
    fn status_mask_clears_status_bits() {
        let flags = COLLECTING | WATCHER_RAN;
        let cleared = flags & STATUS_MASK;

        assert_eq!(cleared & COLLECTING, 0);
        assert_ne!(cleared & WATCHER_RAN, 0);
    }

    #[test]
    fn delimiters_are_mirrored() {
        assert_eq!(OPEN_DELIMITER.len(), CLOSE_DELIMITER.len());
        assert!(DIRECTIVE_PREFIX.ends_with('-'));
    }
}
