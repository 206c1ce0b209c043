//! Shared test harness utilities for quiz crates.

use std::fs;
use std::path::PathBuf;

use quiz_config::Config;
use tempfile::TempDir;

/// Returns a baseline configuration for tests.
pub fn test_config() -> Config {
    Config::default()
}

/// Heading-delimited bank: a true/false question with an answer line, a
/// standard choice question with analysis, a one-line four-option question,
/// and a question with a duplicated option letter.
pub const MIXED_BANK: &str = "\
# 练习

> ## 1. Rust 是内存安全的语言
> - [ ] A. 正确
> - [ ] B. 错误
>
> 答案：A

---

> ## 2. 哪个宏用于格式化字符串
> - [ ] A. println
> - [ ] B. format
> - [ ] C. write
> - [ ] D. panic
>
> 解析：format! 返回 String

---

> ## 3. 迭代器适配器
> - [ ] A.map B.filter C.collect D.sum

---

> ## 4. 重复选项
> - [ ] A. one
> - [ ] B. two
> - [ ] C. three
> - [ ] C. three again
";

/// Separator-only document without headings.
pub const PLAIN_BANK: &str = "\
What is 1 + 1?
> - [ ] A. 1
> - [ ] B. 2
> - [ ] C. 3
> - [ ] D. 4
---
Pick the odd one out.
> - [ ] A. red
> - [ ] B. green
";

/// Writes `contents` to `name` inside a fresh temporary directory.
pub fn write_temp(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    (dir, path)
}
