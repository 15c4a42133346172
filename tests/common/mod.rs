#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const MODULE: &str = "example.com/shop";

/// Create a temporary Go module, returning the dir handle and its root.
/// The caller must hold onto `TempDir` to keep the directory alive.
pub fn setup_module() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    std::fs::write(root.join("go.mod"), format!("module {MODULE}\n\ngo 1.22\n")).unwrap();
    (dir, root)
}

/// Write `content` to `rel` under `root`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

/// Write a coverage profile in `set` mode from `(file, block)` pairs, where
/// `file` is relative to the module root and `block` is
/// `start.col,end.col stmts count`.
pub fn write_profile(root: &Path, blocks: &[(&str, &str)]) -> PathBuf {
    let mut content = String::from("mode: set\n");
    for (file, block) in blocks {
        content.push_str(&format!("{MODULE}/{file}:{block}\n"));
    }
    write_file(root, "cover.out", &content)
}

pub const CART: &str = "package cart

type Cart struct {
\titems []int
}

func (c *Cart) Total() int {
\tt := 0
\tfor _, i := range c.items {
\t\tt += i
\t}
\treturn t
}

func Discount(total int, member bool) int {
\tif total > 100 && member {
\t\treturn total / 10
\t}
\tif total > 50 {
\t\treturn total / 20
\t}
\treturn 0
}
";

/// Blocks for `CART`: `Total` fully covered, `Discount` only its first
/// condition covered.
pub const CART_BLOCKS: &[(&str, &str)] = &[
    ("cart/cart.go", "7.28,9.28 2 1"),
    ("cart/cart.go", "9.28,11.3 1 1"),
    ("cart/cart.go", "12.2,12.10 1 1"),
    ("cart/cart.go", "15.44,16.27 1 1"),
    ("cart/cart.go", "16.27,18.3 1 0"),
    ("cart/cart.go", "19.2,19.17 1 1"),
    ("cart/cart.go", "19.17,21.3 1 0"),
    ("cart/cart.go", "22.2,22.10 1 1"),
];
