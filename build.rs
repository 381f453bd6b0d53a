//! # Build Script for the Locale Dictionaries / 语言字典构建脚本
//!
//! This build script compiles the TOML dictionaries in `locales/` into a
//! type-safe message catalog. Nested tables are flattened into dotted keys
//! (`[header] title = ".."` becomes `header.title`), every key of the base
//! dictionary (`en.toml`) becomes a `MessageKey` variant, and each locale gets
//! its own lookup function.
//!
//! 此构建脚本将 `locales/` 中的 TOML 字典编译为类型安全的消息目录。
//! 嵌套表被展开为点分隔的键（`[header] title = ".."` 变为 `header.title`），
//! 基础字典（`en.toml`）中的每个键都成为 `MessageKey` 的一个变体，
//! 每种语言都会生成各自的查找函数。
//!
//! ## Generated Code / 生成的代码
//!
//! - `MessageKey` enum with all dictionary keys
//! - `AVAILABLE_LOCALES` with every compiled locale code
//! - `lookup()` returning `None` for a key missing from a locale
//!
//! Keys missing from a non-base dictionary are reported as build warnings;
//! the runtime falls back to the base dictionary for them.
//!
//! 非基础字典中缺失的键会作为构建警告报告；运行时将回退到基础字典。

use std::collections::BTreeMap;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// The dictionary every other locale is checked against.
/// 其他语言都以此字典为准进行检查。
const BASE_LOCALE: &str = "en";

/// Flattens a TOML table into dotted keys. Non-string leaves are ignored.
///
/// 将 TOML 表展开为点分隔的键。非字符串的叶子节点会被忽略。
fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            toml::Value::Table(inner) => flatten(&full_key, inner, out),
            _ => {}
        }
    }
}

/// Converts a dotted snake_case key to PascalCase.
/// Used to transform dictionary keys into enum variant names.
///
/// 将点分隔的 snake_case 键转换为 PascalCase。
/// 用于将字典键转换为枚举变体名称。
///
/// # Examples / 示例
/// ```
/// assert_eq!(to_pascal_case("header.title"), "HeaderTitle");
/// assert_eq!(to_pascal_case("app.download_ics"), "AppDownloadIcs");
/// ```
fn to_pascal_case(s: &str) -> String {
    let mut pascal = String::with_capacity(s.len());
    let mut capitalize = true;

    for c in s.chars() {
        if c == '_' || c == '.' || c == '-' {
            capitalize = true;
        } else if capitalize {
            pascal.push(c.to_ascii_uppercase());
            capitalize = false;
        } else {
            pascal.push(c);
        }
    }

    pascal
}

fn read_dictionary(path: &Path) -> BTreeMap<String, String> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    let table: toml::Table = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
    let mut out = BTreeMap::new();
    flatten("", &table, &mut out);
    out
}

/// Main build script function.
///
/// # Process / 处理过程
/// 1. Collect all .toml files from the locales directory
/// 2. Flatten the base dictionary (en.toml) to extract all keys
/// 3. Generate the `MessageKey` enum
/// 4. Generate one lookup function per locale, warning on missing keys
/// 5. Generate the dispatch function and write everything to `OUT_DIR`
///
/// 1. 从 locales 目录收集所有 .toml 文件
/// 2. 展开基础字典（en.toml）以提取所有键
/// 3. 生成 `MessageKey` 枚举
/// 4. 为每种语言生成查找函数，并对缺失的键发出警告
/// 5. 生成分发函数并将所有内容写入 `OUT_DIR`
fn main() -> std::io::Result<()> {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("catalog.rs");
    let locales_dir = Path::new("locales");

    let mut lang_files: Vec<PathBuf> = fs::read_dir(locales_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml"))
        .collect();
    lang_files.sort();

    let base = read_dictionary(&locales_dir.join(format!("{BASE_LOCALE}.toml")));
    let pascal_keys: BTreeMap<_, _> = base
        .keys()
        .map(|key| (key.clone(), to_pascal_case(key)))
        .collect();

    let mut code = String::new();

    // MessageKey enum
    writeln!(
        &mut code,
        "/// Every key of the `{BASE_LOCALE}` dictionary.\n#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\npub enum MessageKey {{"
    )
    .unwrap();
    for pascal in pascal_keys.values() {
        writeln!(&mut code, "    {pascal},").unwrap();
    }
    writeln!(&mut code, "}}\n").unwrap();

    writeln!(&mut code, "impl MessageKey {{").unwrap();
    writeln!(&mut code, "    pub const ALL: &'static [MessageKey] = &[").unwrap();
    for pascal in pascal_keys.values() {
        writeln!(&mut code, "        MessageKey::{pascal},").unwrap();
    }
    writeln!(&mut code, "    ];\n").unwrap();
    writeln!(&mut code, "    /// The dotted key as written in the dictionaries.").unwrap();
    writeln!(&mut code, "    pub fn as_str(self) -> &'static str {{\n        match self {{").unwrap();
    for (key, pascal) in &pascal_keys {
        writeln!(&mut code, "            MessageKey::{pascal} => {key:?},").unwrap();
    }
    writeln!(&mut code, "        }}\n    }}\n").unwrap();
    writeln!(&mut code, "    /// Parses a dotted key, `None` when it is not in the base dictionary.").unwrap();
    writeln!(&mut code, "    pub fn from_dotted(key: &str) -> Option<Self> {{\n        match key {{").unwrap();
    for (key, pascal) in &pascal_keys {
        writeln!(&mut code, "            {key:?} => Some(MessageKey::{pascal}),").unwrap();
    }
    writeln!(&mut code, "            _ => None,\n        }}\n    }}\n}}\n").unwrap();

    // Per-locale lookup functions
    let mut dispatch = Vec::new();
    for path in &lang_files {
        let Some(code_raw) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let fn_code = code_raw.replace('-', "_").to_lowercase();
        dispatch.push((code_raw.to_string(), fn_code.clone()));

        let dictionary = read_dictionary(path);
        for key in base.keys().filter(|k| !dictionary.contains_key(*k)) {
            println!("cargo:warning=Key '{key}' missing from locales/{code_raw}.toml");
        }
        for key in dictionary.keys().filter(|k| !base.contains_key(*k)) {
            println!("cargo:warning=Key '{key}' in locales/{code_raw}.toml is not in {BASE_LOCALE}.toml");
        }

        writeln!(
            &mut code,
            "#[allow(unreachable_patterns)]\nfn lookup_{fn_code}(key: MessageKey) -> Option<&'static str> {{\n    match key {{"
        )
        .unwrap();
        for (key, value) in &dictionary {
            if let Some(pascal) = pascal_keys.get(key) {
                writeln!(&mut code, "        MessageKey::{pascal} => Some({value:?}),").unwrap();
            }
        }
        writeln!(&mut code, "        _ => None,\n    }}\n}}\n").unwrap();
    }

    writeln!(&mut code, "/// Locale codes compiled into the catalog.").unwrap();
    write!(&mut code, "pub const AVAILABLE_LOCALES: &[&str] = &[").unwrap();
    for (raw, _) in &dispatch {
        write!(&mut code, "{raw:?}, ").unwrap();
    }
    writeln!(&mut code, "];\n").unwrap();

    writeln!(
        &mut code,
        "/// Looks a key up in exactly one locale, no fallback.\npub fn lookup(locale: &str, key: MessageKey) -> Option<&'static str> {{\n    match locale {{"
    )
    .unwrap();
    for (raw, fn_code) in &dispatch {
        writeln!(&mut code, "        {raw:?} => lookup_{fn_code}(key),").unwrap();
    }
    writeln!(&mut code, "        _ => None,\n    }}\n}}").unwrap();

    fs::write(&dest_path, code)?;
    println!("cargo:rerun-if-changed=locales/");

    Ok(())
}
