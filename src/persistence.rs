//! Flat text records, one body per line: `x, y, velX, velY, radius, mass`.
//!
//! There is no header row. Blank lines are skipped; any other line must hold
//! exactly six decimal fields or loading fails with [`SimError::Parse`].

use std::io::{BufRead, BufReader, Read, Write};

use ultraviolet::DVec2;

use crate::body::Body;
use crate::error::{Result, SimError};

const FIELDS: usize = 6;

/// Parses a single record. `line` is the 1-based line number used in errors.
pub fn parse_record(text: &str, line: usize) -> Result<Body> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != FIELDS {
        return Err(SimError::Parse {
            line,
            reason: format!("expected {FIELDS} fields, found {}", fields.len()),
        });
    }

    let mut values = [0.0f64; FIELDS];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field.parse().map_err(|e| SimError::Parse {
            line,
            reason: format!("{field:?}: {e}"),
        })?;
    }

    let [x, y, vel_x, vel_y, radius, mass] = values;
    let body = Body::new(DVec2::new(x, y), DVec2::new(vel_x, vel_y), mass, radius);
    if !body.is_valid() {
        return Err(SimError::Parse {
            line,
            reason: format!("mass {mass} and radius {radius} must be positive and finite"),
        });
    }
    Ok(body)
}

pub fn format_record(body: &Body) -> String {
    format!(
        "{}, {}, {}, {}, {}, {}",
        body.pos.x, body.pos.y, body.vel.x, body.vel.y, body.radius, body.mass
    )
}

pub fn load(reader: impl Read) -> Result<Vec<Body>> {
    let mut bodies = Vec::new();
    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        bodies.push(parse_record(&line, i + 1)?);
    }
    log::debug!("loaded {} bodies", bodies.len());
    Ok(bodies)
}

/// Writes every live body; tombstoned ones are skipped.
pub fn save<'a>(mut writer: impl Write, bodies: impl IntoIterator<Item = &'a Body>) -> Result<()> {
    for body in bodies.into_iter().filter(|body| !body.is_dead) {
        writeln!(writer, "{}", format_record(body))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_records_and_skips_blank_lines() {
        let text = "1.5, -2, 0.25, 0, 1.5, 1\n\n10,20,1,1,3,8\n";
        let bodies = load(text.as_bytes()).unwrap();

        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0].pos, DVec2::new(1.5, -2.0));
        assert_eq!(bodies[0].vel, DVec2::new(0.25, 0.0));
        assert_eq!(bodies[1].radius, 3.0);
        assert_eq!(bodies[1].mass, 8.0);
    }

    #[test]
    fn short_record_is_rejected() {
        let err = load("1, 2, 3, 4, 5, 6\n1, 2, 3, 4, 5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SimError::Parse { line: 2, .. }));
    }

    #[test]
    fn garbage_field_is_rejected() {
        let err = parse_record("1, 2, x, 4, 5, 6", 1).unwrap_err();
        assert!(matches!(err, SimError::Parse { line: 1, .. }));
    }

    #[test]
    fn zero_mass_is_rejected() {
        assert!(parse_record("0, 0, 0, 0, 1, 0", 3).is_err());
    }

    #[test]
    fn save_writes_only_live_bodies() {
        let mut dead = Body::default();
        dead.is_dead = true;
        let bodies = [Body::new(DVec2::new(1.0, 2.0), DVec2::zero(), 4.0, 2.0), dead];

        let mut out = Vec::new();
        save(&mut out, &bodies).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "1, 2, 0, 0, 2, 4\n");
        assert_eq!(load(text.as_bytes()).unwrap(), vec![bodies[0]]);
    }
}
