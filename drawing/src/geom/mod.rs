pub mod coordinate;
pub mod path;
pub mod rect;
pub mod sub_path;
