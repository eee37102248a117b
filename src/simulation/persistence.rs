//! Plain-text model file
//!
//! ```text
//! # Base Stations
//! b_1 : (x,y)
//! # Users
//! u_1 : (x,y)
//!   demand : d
//!   station : key:N
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::map::SimulationMap;
use super::types::{Point, SimError, SimResult};

const STATIONS_HEADER: &str = "# Base Stations";
const USERS_HEADER: &str = "# Users";

/// Stations and users read back from a model file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelFile {
    pub stations: Vec<Point>,
    /// `(position, signal demand)` per user
    pub users: Vec<(Point, u32)>,
}

/// Serialize a map in model file layout
pub fn write_model(map: &SimulationMap) -> SimResult<String> {
    let mut output = String::new();

    output.push_str(STATIONS_HEADER);
    output.push('\n');
    for (index, station) in map.get_basestations().enumerate() {
        let position = map.get_vertex_coordinates(&station.key)?;
        output.push_str(&format!("b_{} : {}\n", index + 1, position));
    }

    output.push_str(USERS_HEADER);
    output.push('\n');
    for (index, user) in map.get_users().enumerate() {
        let position = map.get_vertex_coordinates(&user.key)?;
        output.push_str(&format!("u_{} : {}\n", index + 1, position));
        output.push_str(&user.attributes_to_string());
    }

    Ok(output)
}

/// Write `contents` to `path` via a temporary sibling, so a failed write
/// never leaves a truncated file behind
pub fn write_atomically(path: &Path, contents: &str) -> SimResult<()> {
    let tmp_path = temporary_sibling(path);

    let result = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });

    if let Err(e) = result.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(SimError::Io(e));
    }
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Start,
    Stations,
    Users,
}

/// Parse model file contents
pub fn parse_model(contents: &str) -> SimResult<ModelFile> {
    let mut model = ModelFile::default();
    let mut section = Section::Start;

    for (index, raw) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line == STATIONS_HEADER {
            section = Section::Stations;
            continue;
        }
        if line == USERS_HEADER {
            section = Section::Users;
            continue;
        }

        match section {
            Section::Start => return Err(parse_error(line_no, "expected section header")),
            Section::Stations => {
                let position = parse_labelled_point(line, "b_", line_no)?;
                model.stations.push(position);
            }
            Section::Users => {
                if let Some(value) = attribute_value(line, "demand") {
                    let (_, demand) = model
                        .users
                        .last_mut()
                        .ok_or_else(|| parse_error(line_no, "attribute before any user"))?;
                    *demand = value
                        .parse()
                        .map_err(|_| parse_error(line_no, "demand is not a number"))?;
                } else if attribute_value(line, "station").is_some() {
                    // Assignments are recomputed once the map is rebuilt
                    if model.users.is_empty() {
                        return Err(parse_error(line_no, "attribute before any user"));
                    }
                } else {
                    let position = parse_labelled_point(line, "u_", line_no)?;
                    model.users.push((position, 1));
                }
            }
        }
    }

    Ok(model)
}

fn parse_error(line: usize, message: &str) -> SimError {
    SimError::Parse {
        line,
        message: message.to_string(),
    }
}

fn attribute_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    (key.trim() == name).then(|| value.trim())
}

/// Parse `<prefix><n> : (x,y)`
fn parse_labelled_point(line: &str, prefix: &str, line_no: usize) -> SimResult<Point> {
    let (label, coords) = line
        .split_once(':')
        .ok_or_else(|| parse_error(line_no, "expected '<label> : (x,y)'"))?;

    let label = label.trim();
    let valid_label = label
        .strip_prefix(prefix)
        .is_some_and(|n| n.parse::<usize>().is_ok());
    if !valid_label {
        return Err(parse_error(
            line_no,
            &format!("expected label starting with '{}'", prefix),
        ));
    }

    let inner = coords
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| parse_error(line_no, "coordinates must be parenthesized"))?;
    let (x, y) = inner
        .split_once(',')
        .ok_or_else(|| parse_error(line_no, "coordinates must be 'x,y'"))?;

    let x = x
        .trim()
        .parse()
        .map_err(|_| parse_error(line_no, "x is not an integer"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| parse_error(line_no, "y is not an integer"))?;
    Ok(Point::new(x, y))
}
