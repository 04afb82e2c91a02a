//! Fork-join execution: worker loop and launcher

pub mod launcher;
pub mod worker;
