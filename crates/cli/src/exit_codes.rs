//! CLI Exit Code Registry
//!
//! Single source of truth for `odflow` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad arguments, bad parameter values)    |
//! | 3    | Input arrays have incompatible shapes                |
//! | 4    | Malformed input file or missing column               |
//! | 5    | Duplicate location id or primary key                 |
//! | 6    | Catalog config invalid or year not catalogued        |
//! | 7    | File could not be read or written                    |
//! | 8    | `--verify`: computation paths disagree               |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options, invalid model
/// parameters.
pub const EXIT_USAGE: u8 = 2;

/// Mass vector is not a column, or the cost matrix does not match it.
pub const EXIT_SHAPE: u8 = 3;

/// Parse error reading a matrix, vector, or raw report.
pub const EXIT_PARSE: u8 = 4;

/// Duplicate location id in the location list, or duplicate key.
pub const EXIT_DUPLICATE: u8 = 5;

/// Catalog TOML did not parse or validate, or the year is not in it.
pub const EXIT_CONFIG: u8 = 6;

/// Cannot read an input or write an output.
pub const EXIT_IO: u8 = 7;

/// Vectorized and reference paths differ by more than the tolerance.
pub const EXIT_PATH_DISAGREEMENT: u8 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_SHAPE,
            EXIT_PARSE,
            EXIT_DUPLICATE,
            EXIT_CONFIG,
            EXIT_IO,
            EXIT_PATH_DISAGREEMENT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
