//! Logic for resolving/rendering templates

use camino::{Utf8Path, Utf8PathBuf};
use include_dir::{include_dir, Dir};
use minijinja::{Environment, UndefinedBehavior};
use newline_converter::dos2unix;
use serde::Serialize;

use crate::{errors::DistResult, SortedMap};

const TEMPLATE_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");
/// Key used for looking up templates (relative path from the templates dir)
pub type TemplateId = &'static str;
/// Template key for installer.sh
pub const TEMPLATE_INSTALLER_SH: TemplateId = "installer/installer.sh";

/// Main templates struct that gets passed around in the application.
#[derive(Debug)]
pub struct Templates {
    /// Minijinja environment that contains all loaded templates
    env: Environment<'static>,
    /// Traversable/searchable structure of the templates dir
    entries: TemplateDir,
}

/// An entry in the template dir
#[derive(Debug)]
pub enum TemplateEntry {
    /// A directory
    Dir(TemplateDir),
    /// A file
    File(TemplateFile),
}

/// A directory in the template dir
#[derive(Debug)]
pub struct TemplateDir {
    /// relative path of the dir from `TEMPLATE_DIR`
    pub path: Utf8PathBuf,
    /// children
    pub entries: SortedMap<String, TemplateEntry>,
}

/// A file in the template dir
#[derive(Debug)]
pub struct TemplateFile {
    /// name of the file
    pub name: String,
    /// relative path of the file from `TEMPLATE_DIR`
    ///
    /// (This is also the [`TemplateId`][] for this file)
    pub path: Utf8PathBuf,
}

impl Templates {
    /// Load + Parse templates from the binary
    pub fn new() -> DistResult<Self> {
        let mut env = Environment::new();
        env.set_debug(true);
        // Block tags sit on their own lines in the shell templates, and those
        // lines shouldn't leave blank lines behind in the output
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        // A typo'd variable must not silently render as an empty string in a script
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        fn jinja_error(details: String) -> std::result::Result<String, minijinja::Error> {
            Err(minijinja::Error::new(
                minijinja::ErrorKind::EvalBlock,
                details,
            ))
        }
        env.add_function("error", jinja_error);

        let mut entries = TemplateDir {
            path: Utf8PathBuf::new(),
            entries: SortedMap::new(),
        };
        // These `expects` should never happen in production, because all of these things are
        // baked into the binary. If this fails at all it should presumably *always* fail, and
        // so these unwraps will only show up when someone's messing with the templates locally
        // during development and presumably wrote some malformed jinja2 markup.
        Self::load_files(&mut env, &TEMPLATE_DIR, &mut entries)
            .expect("failed to load jinja2 templates from binary");

        Ok(Self { env, entries })
    }

    /// Get the entry for a template by key (the TEMPLATE_* consts)
    fn get_template_entry(&self, key: TemplateId) -> &TemplateEntry {
        let mut parent = &self.entries;
        let mut result: Option<&TemplateEntry> = None;
        for part in key.split('/') {
            result = parent.entries.get(part);
            match result {
                Some(TemplateEntry::Dir(dir)) => parent = dir,
                Some(TemplateEntry::File(_)) => {}
                None => panic!("invalid jinja2 template key: {key}"),
            }
        }

        result.unwrap_or_else(|| panic!("invalid jinja2 template key: {key}"))
    }

    /// Get the entry for a template by key (the TEMPLATE_* consts), and require it to be a file
    pub fn get_template_file(&self, key: TemplateId) -> &TemplateFile {
        if let TemplateEntry::File(file) = self.get_template_entry(key) {
            file
        } else {
            panic!("jinja2 template key was not a file: {key}");
        }
    }

    /// Render a template file to a string, cleaning all newlines to be unix-y
    pub fn render_file_to_clean_string(
        &self,
        key: TemplateId,
        val: &impl Serialize,
    ) -> DistResult<String> {
        let file = self.get_template_file(key);
        let template = self.env.get_template(file.path.as_str())?;
        let rendered = template.render(val)?;
        let cleaned = dos2unix(&rendered).into_owned();
        Ok(cleaned)
    }

    /// load + parse templates from the binary (recursive)
    fn load_files(
        env: &mut Environment<'static>,
        dir: &'static Dir,
        parent: &mut TemplateDir,
    ) -> DistResult<()> {
        for entry in dir.entries() {
            let path = Utf8Path::from_path(entry.path()).expect("non-utf8 jinja2 template path");
            if let Some(file) = entry.as_file() {
                if path.extension().unwrap_or_default() != "j2" {
                    // Skip non-jinja-templates (useful for prototyping)
                    continue;
                }
                // Remove the .j2 extension
                let path = path.with_extension("");
                let name = path
                    .file_name()
                    .expect("jinja2 template didn't have a name!?")
                    .to_owned();
                let contents = file
                    .contents_utf8()
                    .expect("non-utf8 jinja2 template")
                    .to_string();

                env.add_template_owned(path.to_string(), contents)?;
                parent
                    .entries
                    .insert(name.clone(), TemplateEntry::File(TemplateFile { name, path }));
            }
            if let Some(dir) = entry.as_dir() {
                let name = path
                    .file_name()
                    .expect("jinja2 template didn't have a name!?")
                    .to_owned();
                let mut new_dir = TemplateDir {
                    path: path.to_owned(),
                    entries: SortedMap::new(),
                };
                Self::load_files(env, dir, &mut new_dir)?;
                parent.entries.insert(name, TemplateEntry::Dir(new_dir));
            }
        }

        Ok(())
    }
}
