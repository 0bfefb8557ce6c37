pub mod db;
pub mod judge0;

pub use db::DbAdapter;
pub use judge0::Judge0Adapter;
