pub mod directory_walker;
pub mod file_filter;

pub use directory_walker::{sorted_records, DirectoryWalker, FileRecord, ScanOutcome, ScanStatistics, ROOT_GROUP};
pub use file_filter::{ExcludedDirectorySet, FileFilter, SkipReason};
