//! Apple `.strings` and `.stringsdict` files, rendered by the export endpoint.
//!
//! When `iosLocales` maps a variant to a locale, its files are placed in the
//! matching `{locale}.lproj` directory so Xcode picks them up as a localization.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{config::IosLocales, formats::FormatStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IosFlavor {
    Strings,
    Stringsdict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosStrategy {
    out_dir: PathBuf,
    flavor: IosFlavor,
    /// Variant id to locale code.
    locales: BTreeMap<String, String>,
}

impl IosStrategy {
    pub fn new(out_dir: impl Into<PathBuf>, flavor: IosFlavor, locales: Option<&IosLocales>) -> Self {
        IosStrategy {
            out_dir: out_dir.into(),
            flavor,
            locales: locales
                .into_iter()
                .flatten()
                .flat_map(|entry| entry.iter())
                .map(|(variant, locale)| (variant.clone(), locale.clone()))
                .collect(),
        }
    }

    pub fn locale_for(&self, variant_id: &str) -> Option<&str> {
        self.locales.get(variant_id).map(String::as_str)
    }
}

impl FormatStrategy for IosStrategy {
    fn extension(&self) -> &'static str {
        match self.flavor {
            IosFlavor::Strings => "strings",
            IosFlavor::Stringsdict => "stringsdict",
        }
    }

    fn export_format_id(&self) -> Option<&'static str> {
        match self.flavor {
            IosFlavor::Strings => Some("ios-strings"),
            IosFlavor::Stringsdict => Some("ios-stringsdict"),
        }
    }

    fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn directory_for(&self, variant_id: &str) -> PathBuf {
        locale_directory(&self.out_dir, self.locale_for(variant_id))
    }
}

/// `{out_dir}/{locale}.lproj` for mapped variants, `out_dir` otherwise.
pub fn locale_directory(out_dir: &Path, locale: Option<&str>) -> PathBuf {
    match locale {
        Some(locale) => out_dir.join(format!("{}.lproj", locale)),
        None => out_dir.to_path_buf(),
    }
}
