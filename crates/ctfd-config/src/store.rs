//! The layered store: sections of raw option strings parsed from INI text
//!
//! Supported syntax:
//! - `[section]` headers; `[DEFAULT]` supplies fallbacks for every section
//! - `KEY = value` or `KEY: value` (keys are case-sensitive, values trimmed)
//! - full-line comments starting with `#` or `;`
//! - indented continuation lines, appended to the previous value with `\n`

use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result, SourceLocation};

/// Name of the section whose options are visible from every other section
pub const DEFAULT_SECTION: &str = "DEFAULT";

type Options = IndexMap<String, String>;

/// Ordered sections of raw option values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    defaults: Options,
    sections: IndexMap<String, Options>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text
    pub fn from_ini_str(content: &str) -> Result<Self> {
        IniParser::new("<string>").parse(content)
    }

    /// Read and parse an INI file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(file.clone(), &e))?;
        log::debug!("Loaded configuration file {}", file);
        IniParser::new(file).parse(&content)
    }

    /// Builder-style insertion, creating the section when needed
    pub fn with(
        mut self,
        section: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(section, option, value);
        self
    }

    /// Set an option, creating the section when needed
    pub fn set(
        &mut self,
        section: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
    ) {
        let section = section.into();
        let options = if section == DEFAULT_SECTION {
            &mut self.defaults
        } else {
            self.sections.entry(section).or_default()
        };
        options.insert(option.into(), value.into());
    }

    /// Raw value of an option, falling back to `[DEFAULT]`
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(option))
            .or_else(|| self.defaults.get(option))
            .map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Section names in file order (without `DEFAULT`)
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Option names visible from a section: its own, then inherited defaults
    pub fn option_names(&self, section: &str) -> Vec<&str> {
        let own = self.sections.get(section);
        let mut names: Vec<&str> = own
            .map(|options| options.keys().map(String::as_str).collect())
            .unwrap_or_default();
        for key in self.defaults.keys() {
            if own.map_or(true, |options| !options.contains_key(key)) {
                names.push(key);
            }
        }
        names
    }
}

struct IniParser {
    file: String,
    store: Store,
    section: Option<String>,
    seen_default: bool,
    /// Option currently open for continuation lines, and its indent
    last_option: Option<(String, usize)>,
}

impl IniParser {
    fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            store: Store::new(),
            section: None,
            seen_default: false,
            last_option: None,
        }
    }

    fn parse(mut self, content: &str) -> Result<Store> {
        for (idx, line) in content.lines().enumerate() {
            self.parse_line(line)
                .map_err(|e| e.with_source_location(self.location(idx + 1)))?;
        }
        Ok(self.store)
    }

    fn location(&self, line: usize) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            line: Some(line),
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.last_option = None;
            return Ok(());
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            return Ok(());
        }

        let indent = line.len() - line.trim_start().len();
        if let Some((option, option_indent)) = self.last_option.clone() {
            if indent > option_indent {
                if let Some(value) = self.current_options()?.get_mut(&option) {
                    value.push('\n');
                    value.push_str(trimmed);
                }
                return Ok(());
            }
        }

        if trimmed.starts_with('[') {
            return self.parse_section_header(trimmed);
        }
        self.parse_option(trimmed, indent)
    }

    fn parse_section_header(&mut self, trimmed: &str) -> Result<()> {
        let name = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .map(str::trim)
            .ok_or_else(|| Error::syntax(format!("Malformed section header: {}", trimmed)))?;
        if name.is_empty() {
            return Err(Error::syntax("Empty section name"));
        }

        let exists = if name == DEFAULT_SECTION {
            std::mem::replace(&mut self.seen_default, true)
        } else {
            self.store.sections.contains_key(name)
        };
        if exists {
            return Err(Error::syntax(format!("Section '{}' already exists", name)));
        }

        if name != DEFAULT_SECTION {
            self.store.sections.insert(name.to_string(), Options::new());
        }
        self.section = Some(name.to_string());
        self.last_option = None;
        Ok(())
    }

    fn parse_option(&mut self, trimmed: &str, indent: usize) -> Result<()> {
        let delimiter = trimmed
            .find(['=', ':'])
            .ok_or_else(|| Error::syntax(format!("Expected 'KEY = value', got: {}", trimmed)))?;
        let key = trimmed[..delimiter].trim();
        let value = trimmed[delimiter + 1..].trim();
        if key.is_empty() {
            return Err(Error::syntax("Option name is empty"));
        }

        let section = self.section.clone().unwrap_or_default();
        let options = self.current_options()?;
        if options.contains_key(key) {
            return Err(Error::syntax(format!(
                "Option '{}' already exists in section '{}'",
                key, section
            ))
            .with_path(format!("{}.{}", section, key)));
        }
        options.insert(key.to_string(), value.to_string());
        self.last_option = Some((key.to_string(), indent));
        Ok(())
    }

    fn current_options(&mut self) -> Result<&mut Options> {
        match self.section.as_deref() {
            None => Err(Error::syntax("Option outside of any section")
                .with_help("Start the file with a section header such as [server]")),
            Some(DEFAULT_SECTION) => Ok(&mut self.store.defaults),
            Some(name) => Ok(self.store.sections.entry(name.to_string()).or_default()),
        }
    }
}
