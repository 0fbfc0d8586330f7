//! Question service adapters.

mod leetcode;

pub use leetcode::LeetCodeQuestionLookup;
