pub mod machine;
pub mod prompt;
