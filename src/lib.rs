//! text-replacer
//!
//! 画面上のテキストを実行時に翻訳へ差し替えるエンジン。数値を含む文字列は
//! `{n1}` 形式のパターンとして照合し、観測した文字列は既存の翻訳を壊さずに
//! コーパスへマージする。

pub mod backend;
pub mod config;
pub mod corpus;
pub mod host;
pub mod matcher;
pub mod pattern;
pub mod runtime;
pub mod table;

mod test_utils;

// よく使う型を再エクスポート
pub use host::{
    FragmentId,
    HostAdapter,
    LiveTextFragment,
    MemoryHost,
};
pub use runtime::{
    CycleReport,
    ReplacerError,
    TextReplacer,
};
