/// Extension classification for organizing files by type.
///
/// This module maps lowercase file extensions to the name of the category
/// folder a file is moved into (e.g., `"png"` → `"PNG"`, `"docx"` → `"Word"`).
/// Extensions that are not in the table fall back to [`FALLBACK_CATEGORY`].
///
/// # Examples
///
/// ```
/// use typesort::file_category::{classify, FALLBACK_CATEGORY};
///
/// assert_eq!(classify("holiday.JPG"), "JPEG");
/// assert_eq!(classify("notes.txt"), "Text");
/// assert_eq!(classify("Makefile"), FALLBACK_CATEGORY);
/// ```
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

/// Category for files whose extension is unknown or missing.
pub const FALLBACK_CATEGORY: &str = "Other Files";

static STANDARD_MAP: LazyLock<ExtensionMap> = LazyLock::new(ExtensionMap::new);

/// Immutable mapping from lowercase extension to category folder name.
#[derive(Debug, Clone)]
pub struct ExtensionMap {
    extension_map: HashMap<&'static str, &'static str>,
}

impl ExtensionMap {
    /// Creates a new `ExtensionMap` with the standard table.
    pub fn new() -> Self {
        let mut map = Self {
            extension_map: HashMap::new(),
        };
        map.populate_standard_mappings();
        map
    }

    fn populate_standard_mappings(&mut self) {
        // Microsoft Office
        self.add_extension_mapping("doc", "Word");
        self.add_extension_mapping("docx", "Word");
        self.add_extension_mapping("xls", "Excel");
        self.add_extension_mapping("xlsx", "Excel");
        self.add_extension_mapping("ppt", "PowerPoint");
        self.add_extension_mapping("pptx", "PowerPoint");

        // LibreOffice
        self.add_extension_mapping("odt", "Writer");
        self.add_extension_mapping("ods", "Calc");
        self.add_extension_mapping("odp", "Impress");

        // Adobe
        self.add_extension_mapping("ai", "Illustrator");
        self.add_extension_mapping("psd", "Photoshop");
        self.add_extension_mapping("aep", "After Effects");
        self.add_extension_mapping("indd", "InDesign");
        self.add_extension_mapping("indt", "InDesign");
        self.add_extension_mapping("idml", "InDesign");
        self.add_extension_mapping("eps", "EPS");
        self.add_extension_mapping("prproj", "Premiere Pro");

        // Documents
        self.add_extension_mapping("pdf", "PDF");
        self.add_extension_mapping("txt", "Text");
        self.add_extension_mapping("rtf", "RTF");
        self.add_extension_mapping("docm", "Word Macro-Enabled");
        self.add_extension_mapping("dotx", "Word Template");
        self.add_extension_mapping("md", "Markdown");

        // Fonts
        self.add_extension_mapping("ttf", "TrueType Font");
        self.add_extension_mapping("otf", "OpenType Font");
        self.add_extension_mapping("woff", "Web Open Font Format");
        self.add_extension_mapping("woff2", "Web Open Font Format 2");
        self.add_extension_mapping("eot", "Embedded OpenType");

        // Images
        self.add_extension_mapping("jpg", "JPEG");
        self.add_extension_mapping("jpeg", "JPEG");
        self.add_extension_mapping("png", "PNG");
        self.add_extension_mapping("gif", "GIF");
        self.add_extension_mapping("bmp", "BMP");
        self.add_extension_mapping("tiff", "TIFF");
        self.add_extension_mapping("svg", "SVG");

        // Video
        self.add_extension_mapping("mp4", "MP4");
        self.add_extension_mapping("avi", "AVI");
        self.add_extension_mapping("mkv", "MKV");
        self.add_extension_mapping("mov", "MOV");
        self.add_extension_mapping("wmv", "WMV");
        self.add_extension_mapping("flv", "FLV");
        self.add_extension_mapping("webm", "WebM");

        // Audio
        self.add_extension_mapping("mp3", "MP3");
        self.add_extension_mapping("wav", "WAV");
        self.add_extension_mapping("aac", "AAC");
        self.add_extension_mapping("flac", "FLAC");
        self.add_extension_mapping("ogg", "OGG");
        self.add_extension_mapping("m4a", "M4A");
        self.add_extension_mapping("wma", "WMA");

        // 3D and modeling
        self.add_extension_mapping("blend", "Blender");
        self.add_extension_mapping("obj", "OBJ");
        self.add_extension_mapping("fbx", "FBX");
        self.add_extension_mapping("stl", "STL");
        self.add_extension_mapping("dae", "COLLADA");

        // Archives
        self.add_extension_mapping("zip", "Zip");
        self.add_extension_mapping("rar", "RAR");
        self.add_extension_mapping("7z", "7-Zip");
        self.add_extension_mapping("tar", "Tar");
        self.add_extension_mapping("gz", "GZ");
        self.add_extension_mapping("bz2", "Bzip2");
        self.add_extension_mapping("xz", "XZ");

        // Code and scripts
        self.add_extension_mapping("py", "Python");
        self.add_extension_mapping("js", "JavaScript");
        self.add_extension_mapping("html", "HTML");
        self.add_extension_mapping("css", "CSS");
        self.add_extension_mapping("java", "Java");
        self.add_extension_mapping("c", "C");
        self.add_extension_mapping("cpp", "C++");
        self.add_extension_mapping("cs", "C#");
        self.add_extension_mapping("rb", "Ruby");
        self.add_extension_mapping("php", "PHP");
        self.add_extension_mapping("go", "Go");
        self.add_extension_mapping("swift", "Swift");
        self.add_extension_mapping("ts", "TypeScript");

        // Backup and temporary
        self.add_extension_mapping("bak", "Backup");
        self.add_extension_mapping("tmp", "Temporary");
        self.add_extension_mapping("old", "Old");
        self.add_extension_mapping("sav", "Save");
    }

    fn add_extension_mapping(&mut self, ext: &'static str, category: &'static str) {
        let previous = self.extension_map.insert(ext, category);
        debug_assert!(previous.is_none(), "duplicate extension mapping: {ext}");
    }

    /// Maps a file extension (without the dot) to a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use typesort::file_category::ExtensionMap;
    ///
    /// let map = ExtensionMap::default();
    /// assert_eq!(map.category_for_extension("pdf"), Some("PDF"));
    /// assert_eq!(map.category_for_extension("PNG"), Some("PNG"));
    /// assert_eq!(map.category_for_extension("xyz"), None);
    /// ```
    pub fn category_for_extension(&self, ext: &str) -> Option<&'static str> {
        self.extension_map.get(ext.to_lowercase().as_str()).copied()
    }

    /// Determines the category folder for a file name.
    ///
    /// Names without an extension, including dotfiles such as `.bashrc`,
    /// get [`FALLBACK_CATEGORY`].
    pub fn classify(&self, file_name: &str) -> &'static str {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.category_for_extension(ext))
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Every category folder name this map can produce, fallback included.
    pub fn all_categories(&self) -> BTreeSet<&'static str> {
        self.extension_map
            .values()
            .copied()
            .chain(std::iter::once(FALLBACK_CATEGORY))
            .collect()
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the shared standard extension map.
pub fn standard_map() -> &'static ExtensionMap {
    &STANDARD_MAP
}

/// Classifies a file name with the standard extension map.
pub fn classify(file_name: &str) -> &'static str {
    STANDARD_MAP.classify(file_name)
}

/// All category folder names of the standard map, fallback included.
pub fn all_categories() -> BTreeSet<&'static str> {
    STANDARD_MAP.all_categories()
}
