//! Dynamic library loading for the native wallet module
//!
//! Provides cross-platform loading using `libloading`. Handles
//! platform-specific library naming conventions and search paths.

use crate::error::{LoadError, SdkResult};
use crate::ffi::symbols::SymbolSource;
use libloading::Library;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves a native module name or path to a file and opens it
pub struct LibraryLoader {
    /// Directories tried in order for bare library names
    search_paths: Vec<PathBuf>,
}

impl LibraryLoader {
    /// Create a new library loader with default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::default_search_paths(),
        }
    }

    /// Get platform-specific default library search paths
    ///
    /// - Linux: /usr/lib, /usr/local/lib, /lib (plus lib64 variants)
    /// - macOS: /usr/lib, /usr/local/lib, /opt/homebrew/lib
    /// - Windows: C:\Windows\System32
    /// - All platforms: current working directory first
    fn default_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        #[cfg(target_os = "linux")]
        {
            paths.push(PathBuf::from("/usr/lib"));
            paths.push(PathBuf::from("/usr/local/lib"));
            paths.push(PathBuf::from("/lib"));

            if cfg!(target_pointer_width = "64") {
                paths.push(PathBuf::from("/usr/lib64"));
                paths.push(PathBuf::from("/lib64"));
            }
        }

        #[cfg(target_os = "macos")]
        {
            paths.push(PathBuf::from("/usr/lib"));
            paths.push(PathBuf::from("/usr/local/lib"));
            paths.push(PathBuf::from("/opt/homebrew/lib"));
        }

        #[cfg(target_os = "windows")]
        {
            paths.push(PathBuf::from("C:\\Windows\\System32"));
            if let Ok(system_root) = std::env::var("SystemRoot") {
                paths.push(PathBuf::from(format!("{}\\System32", system_root)));
            }
        }

        if let Ok(cwd) = std::env::current_dir() {
            paths.insert(0, cwd);
        }

        paths
    }

    /// Resolve a library name or path to an existing file
    ///
    /// Anything containing a path separator or an extension is taken as a
    /// path. Bare names try `lib{name}.{so,dylib}` / `{name}.dll` in every
    /// search path.
    pub fn resolve_library_path(&self, name: &str) -> Option<PathBuf> {
        let path = Path::new(name);
        if path.components().count() > 1 || path.extension().is_some() {
            return path.exists().then(|| path.to_path_buf());
        }

        let extensions: &[&str] = if cfg!(target_os = "windows") {
            &["dll"]
        } else if cfg!(target_os = "macos") {
            &["dylib", "so"]
        } else {
            &["so"]
        };

        let prefixes: &[&str] = if cfg!(target_os = "windows") {
            &["", "lib"]
        } else {
            &["lib", ""]
        };

        for search_path in &self.search_paths {
            for prefix in prefixes {
                for ext in extensions {
                    let full_path = search_path.join(format!("{}{}.{}", prefix, name, ext));
                    if full_path.exists() {
                        return Some(full_path);
                    }
                }
            }
        }

        None
    }

    /// Open the native module
    ///
    /// Opening runs the module's initialisers in this process; the caller
    /// must trust the file.
    pub fn open(&self, name: &str) -> SdkResult<NativeLibrary> {
        let path = self
            .resolve_library_path(name)
            .ok_or_else(|| LoadError::LibraryNotFound(name.to_string()))?;

        // SAFETY: loading runs foreign initialisers; trust is the caller's contract
        let library = unsafe { Library::new(&path) }.map_err(|e| LoadError::LoadFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %path.display(), "native module loaded");
        Ok(NativeLibrary { library, path })
    }

    /// Add a custom search path (prepended to search list)
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.insert(0, path);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// An opened native module
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the module; every pointer bound from it becomes invalid
    pub fn close(self) -> SdkResult<()> {
        let path = self.path;
        self.library
            .close()
            .map_err(|e| LoadError::UnloadFailed(e.to_string()))?;
        debug!(path = %path.display(), "native module unloaded");
        Ok(())
    }
}

impl SymbolSource for NativeLibrary {
    fn symbol_address(&self, name: &str) -> Option<*const c_void> {
        // SAFETY: only the address is read here; typing happens at bind time
        unsafe {
            self.library
                .get::<*const c_void>(name.as_bytes())
                .ok()
                .map(|symbol| *symbol)
        }
    }
}
