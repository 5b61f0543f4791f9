//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::path::Path;

use crate::corpus::{
    Corpus,
    CorpusFormat,
    TranslationEntry,
    save_corpus,
};

/// テスト用の Corpus を作成する
///
/// # Arguments
/// * `pairs` - (原文, 訳文) の組
pub(crate) fn corpus_of(pairs: &[(&str, &str)]) -> Corpus {
    pairs
        .iter()
        .map(|(original, translated)| TranslationEntry::new(*original, *translated))
        .collect()
}

/// Corpus をファイルに書き出す（配列形式）
pub(crate) fn write_corpus(path: &Path, pairs: &[(&str, &str)]) {
    save_corpus(path, &corpus_of(pairs), CorpusFormat::Array).unwrap();
}
