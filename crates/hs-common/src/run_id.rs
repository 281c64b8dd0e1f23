//! Batch run identifiers.
//!
//! Every matching run gets its own ULID. It is attached to each log line of
//! the run and written to `job_matches.last_run_id`, so a row can be traced
//! back to the run that last scored it. ULIDs sort by creation time.

use once_cell::sync::Lazy;
use ulid::Ulid;

/// Process-level ID, generated once at first access.
static PROCESS_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// ID shared by every run started from this process.
#[inline]
pub fn process() -> &'static str {
    &PROCESS_ID
}

/// Fresh ID for a single batch run.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_id_is_stable() {
        assert_eq!(process(), process());
        assert_eq!(process().len(), 26);
    }

    #[test]
    fn run_ids_are_unique_and_fit_the_column() {
        let a = generate();
        let b = generate();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
    }

    #[test]
    fn run_ids_sort_by_time() {
        let older = generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = generate();
        assert!(older < newer);
    }
}
