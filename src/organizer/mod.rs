pub mod category_scanner;
pub mod file_copier;
pub mod split;

pub use category_scanner::{Category, CategoryScanner};
pub use file_copier::FileCopier;
pub use split::{split_entries, train_count, SplitPlan, Subset};
