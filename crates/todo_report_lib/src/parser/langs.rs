use std::{collections::HashMap, path::Path};

/// Which single-line comment introducer a file uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CommentProfile {
    /// `//`, for C-family source.
    #[default]
    DoubleSlash,
    /// `#`, for scripts and config files.
    Hash,
}

impl CommentProfile {
    pub fn introducer(&self) -> &'static str {
        match self {
            CommentProfile::DoubleSlash => "//",
            CommentProfile::Hash => "#",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SupportedLanguage {
    pub name: &'static str,
    pub profile: CommentProfile,
    pub file_extensions: Vec<&'static str>,
    /// Info string used for the language's fenced code blocks.
    pub fence: &'static str,
}

/// Files we don't recognize are scanned as C-family source.
pub static FALLBACK_LANGUAGE: SupportedLanguage = SupportedLanguage {
    name: "Unknown",
    profile: CommentProfile::DoubleSlash,
    file_extensions: Vec::new(),
    fence: "cpp",
};

pub fn lang(
    name: &'static str,
    profile: CommentProfile,
    exts: Vec<&'static str>,
    fence: &'static str,
) -> SupportedLanguage {
    SupportedLanguage {
        name,
        profile,
        file_extensions: exts,
        fence,
    }
}

pub fn all_supported_langs() -> Vec<SupportedLanguage> {
    use CommentProfile::*;

    vec![
        lang(
            "C, C++",
            DoubleSlash,
            vec![
                "h", "c", "cpp", "cxx", "cc", "hpp", "hxx", "hh", "inl", "ipp", "ino",
            ],
            "cpp",
        ),
        lang("C#", DoubleSlash, vec!["cs"], "csharp"),
        lang("Objective-C", DoubleSlash, vec!["m", "mm"], "objc"),
        lang("Rust", DoubleSlash, vec!["rs"], "rust"),
        lang("Go", DoubleSlash, vec!["go"], "go"),
        lang("Java", DoubleSlash, vec!["java"], "java"),
        lang("Kotlin", DoubleSlash, vec!["kt", "kts"], "kotlin"),
        lang("Swift", DoubleSlash, vec!["swift"], "swift"),
        lang("Zig", DoubleSlash, vec!["zig"], "zig"),
        lang("JavaScript", DoubleSlash, vec!["js", "mjs", "jsx"], "js"),
        lang("Typescript", DoubleSlash, vec!["ts", "tsx"], "ts"),
        lang(
            "GLSL",
            DoubleSlash,
            vec!["glsl", "vert", "frag", "geom", "comp", "tesc", "tese"],
            "glsl",
        ),
        lang("HLSL", DoubleSlash, vec!["hlsl", "fx"], "hlsl"),
        lang("WGSL", DoubleSlash, vec!["wgsl"], "wgsl"),
        lang("Metal", DoubleSlash, vec!["metal"], "metal"),
        lang("Python", Hash, vec!["py"], "python"),
        lang("Shell", Hash, vec!["sh", "bash", "zsh"], "sh"),
        lang("Cmake", Hash, vec!["cmake"], "cmake"),
        lang("Make", Hash, vec!["mk", "make"], "make"),
        lang("Ruby", Hash, vec!["rb"], "ruby"),
        lang("Perl", Hash, vec!["pl", "pm"], "perl"),
        lang("Nix", Hash, vec!["nix"], "nix"),
        lang("YAML", Hash, vec!["yaml", "yml"], "yaml"),
        lang("TOML", Hash, vec!["toml"], "toml"),
        lang("Properties", Hash, vec!["properties", "conf", "cfg"], "ini"),
        lang("Terraform", Hash, vec!["tf"], "hcl"),
    ]
}

/// Looks up languages by lower-cased file extension.
#[derive(Clone, Debug)]
pub struct LanguageMap(HashMap<&'static str, SupportedLanguage>);

impl Default for LanguageMap {
    fn default() -> Self {
        let mut lang_map = HashMap::new();
        for language in all_supported_langs().into_iter() {
            for ext in language.file_extensions.iter() {
                lang_map.entry(*ext).or_insert_with(|| language.clone());
            }
        }
        LanguageMap(lang_map)
    }
}

impl LanguageMap {
    pub fn find_by_extension(&self, ext: &str) -> Option<&SupportedLanguage> {
        self.0.get(ext.to_lowercase().as_str())
    }

    /// Find the language of the file at `path`, falling back to
    /// [`FALLBACK_LANGUAGE`].
    ///
    /// ```rust
    /// use todo_report_lib::parser::langs::*;
    ///
    /// let langs = LanguageMap::default();
    /// assert_eq!(langs.for_path("tools/build.SH").profile, CommentProfile::Hash);
    /// assert_eq!(langs.for_path("engine/render.cpp").profile, CommentProfile::DoubleSlash);
    /// assert_eq!(langs.for_path("LICENSE").fence, "cpp");
    /// ```
    pub fn for_path(&self, path: impl AsRef<Path>) -> &SupportedLanguage {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.find_by_extension(ext))
            .unwrap_or(&FALLBACK_LANGUAGE)
    }
}
