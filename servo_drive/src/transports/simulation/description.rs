//! Device-description (ESI) default-value loader.
//!
//! Only `Object` entries whose index belongs to the fixed register map are
//! imported. For each such object:
//!
//! - `Info/SubItem` entries map, by position, to subindex 0, 1, 2, ... with
//!   the value of their `Info/DefaultData`
//! - otherwise the object's own `Info/DefaultData` maps to subindex 0
//!
//! Missing or empty `DefaultData` yields 0. Values are hexadecimal, with an
//! optional `#x` prefix.

use quick_xml::Reader;
use quick_xml::events::Event;
use servo_common::consts::is_mapped_index;
use servo_common::transport::DriveError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Immutable default register values parsed from a device description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDefaults {
    values: HashMap<(u16, u8), u32>,
}

impl DeviceDefaults {
    /// Parse defaults from ESI XML text.
    ///
    /// # Errors
    /// `DriveError::DescriptionParse` on malformed XML or non-hex values.
    pub fn parse(xml: &str) -> Result<Self, DriveError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut values = HashMap::new();
        let mut path: Vec<String> = Vec::new();
        let mut object: Option<ObjectEntry> = None;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(DriveError::DescriptionParse(format!(
                        "XML error at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            };

            match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    path.push(name);
                    open_element(&path, &mut object);
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    path.push(name);
                    open_element(&path, &mut object);
                    close_element(&mut path, &mut object, &mut values)?;
                }
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| DriveError::DescriptionParse(e.to_string()))?;
                    if let Some(entry) = object.as_mut() {
                        entry.text(&path, text.trim())?;
                    }
                }
                Event::End(_) => close_element(&mut path, &mut object, &mut values)?,
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { values })
    }

    /// Read and parse an ESI file.
    pub fn load(path: &Path) -> Result<Self, DriveError> {
        let xml = std::fs::read_to_string(path).map_err(|e| {
            DriveError::DescriptionParse(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let defaults = Self::parse(&xml)?;
        info!(
            "Loaded {} default register values from {}",
            defaults.len(),
            path.display()
        );
        Ok(defaults)
    }

    /// Default for `(index, subindex)`, if described.
    pub fn get(&self, index: u16, subindex: u8) -> Option<u32> {
        self.values.get(&(index, subindex)).copied()
    }

    /// Iterate over `((index, subindex), value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&(u16, u8), &u32)> {
        self.values.iter()
    }

    /// Number of imported registers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if no register was imported.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `Object` element being collected.
#[derive(Debug)]
struct ObjectEntry {
    /// Depth of the `Object` element in the element path.
    depth: usize,
    index: Option<u16>,
    default: Option<u32>,
    sub_items: Vec<Option<u32>>,
}

impl ObjectEntry {
    fn relative<'a>(&self, path: &'a [String]) -> Vec<&'a str> {
        path[self.depth..].iter().map(String::as_str).collect()
    }

    fn text(&mut self, path: &[String], text: &str) -> Result<(), DriveError> {
        match self.relative(path).as_slice() {
            ["Index"] => {
                let index = parse_hex(text)?;
                self.index = Some(u16::try_from(index).map_err(|_| {
                    DriveError::DescriptionParse(format!("Object index out of range: {text}"))
                })?);
            }
            ["Info", "DefaultData"] => self.default = Some(parse_hex(text)?),
            ["Info", "SubItem", "Info", "DefaultData"] => {
                if let Some(slot) = self.sub_items.last_mut() {
                    *slot = Some(parse_hex(text)?);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn open_element(path: &[String], object: &mut Option<ObjectEntry>) {
    match object {
        None if path.last().is_some_and(|n| n == "Object") => {
            *object = Some(ObjectEntry {
                depth: path.len(),
                index: None,
                default: None,
                sub_items: Vec::new(),
            });
        }
        Some(entry) if entry.relative(path) == ["Info", "SubItem"] => {
            entry.sub_items.push(None);
        }
        _ => {}
    }
}

fn close_element(
    path: &mut Vec<String>,
    object: &mut Option<ObjectEntry>,
    values: &mut HashMap<(u16, u8), u32>,
) -> Result<(), DriveError> {
    let closes_object = object.as_ref().is_some_and(|o| o.depth == path.len());
    path.pop();
    if !closes_object {
        return Ok(());
    }

    let Some(entry) = object.take() else {
        return Ok(());
    };
    let Some(index) = entry.index else {
        return Ok(());
    };
    if !is_mapped_index(index) {
        return Ok(());
    }

    if entry.sub_items.is_empty() {
        values.insert((index, 0), entry.default.unwrap_or(0));
    } else {
        for (sub, value) in entry.sub_items.iter().enumerate() {
            let sub = u8::try_from(sub).map_err(|_| {
                DriveError::DescriptionParse(format!("Too many sub-items for 0x{index:04X}"))
            })?;
            values.insert((index, sub), value.unwrap_or(0));
        }
    }
    debug!("Imported defaults for 0x{:04X}", index);
    Ok(())
}

fn parse_hex(text: &str) -> Result<u32, DriveError> {
    let digits = text.trim_start_matches("#x");
    if digits.is_empty() {
        return Ok(0);
    }
    u32::from_str_radix(digits, 16)
        .map_err(|e| DriveError::DescriptionParse(format!("Invalid hex value '{text}': {e}")))
}

/// Parsed device descriptions, shared across sessions.
///
/// Each file is parsed once; later sessions reuse the same immutable
/// `DeviceDefaults`.
#[derive(Debug, Default)]
pub struct DescriptionCache {
    entries: Mutex<HashMap<PathBuf, Arc<DeviceDefaults>>>,
}

impl DescriptionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for `path`, parsing the file on first use.
    pub fn load(&self, path: &Path) -> Result<Arc<DeviceDefaults>, DriveError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(defaults) = entries.get(path) {
            debug!("Description cache hit for {}", path.display());
            return Ok(Arc::clone(defaults));
        }
        let defaults = Arc::new(DeviceDefaults::load(path)?);
        entries.insert(path.to_path_buf(), Arc::clone(&defaults));
        Ok(defaults)
    }

    /// Number of cached descriptions.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
