//! The line-oriented protocol that drives a [`RoadMap`] from standard input:
//! one operation per line, `;`-separated fields, `ERROR <lineNumber>` on any
//! failure. Exposed as [`run`] over generic reader/writers so it can be
//! exercised without spawning the compiled binary.

use std::io::{self, BufRead, Write};

use crate::map::{RoadMap, RouteSegment};

/// Drives `map` from `input`, writing successful `getRouteDescription`
/// output to `out` and `ERROR <n>` lines to `err`. Never returns an error of
/// its own for malformed input — that's reported on `err` per line — only
/// for genuine I/O failure reading or writing.
///
/// A final line with no trailing newline (input ends mid-line) is dropped
/// without being processed: a line only counts as read once a terminating
/// `\n` has actually been seen.
pub fn run<R: BufRead, W1: Write, W2: Write>(mut input: R, out: &mut W1, err: &mut W2) -> io::Result<()> {
    let mut map = RoadMap::new();
    let mut line_number: u64 = 1;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let n = input.read_until(b'\n', &mut raw)?;
        if n == 0 || raw.last() != Some(&b'\n') {
            break;
        }
        raw.pop();
        for byte in raw.iter_mut() {
            if *byte == 0 {
                *byte = 1;
            }
        }
        let line = String::from_utf8_lossy(&raw).into_owned();
        process_line(&mut map, &line, line_number, out, err)?;
        line_number += 1;
    }
    Ok(())
}

fn process_line<W1: Write, W2: Write>(
    map: &mut RoadMap,
    line: &str,
    line_number: u64,
    out: &mut W1,
    err: &mut W2,
) -> io::Result<()> {
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }
    if line.starts_with(';') {
        return report_error(err, line_number);
    }

    let fields: Vec<&str> = line.split(';').collect();
    let command = fields[0];
    let args = &fields[1..];

    let route_id_candidate = parse_route_id_loose(command);
    let ok = if (1..1000).contains(&route_id_candidate) {
        handle_route_declaration(map, route_id_candidate, args)
    } else {
        handle_named_command(map, command, args, out)?
    };

    if !ok {
        return report_error(err, line_number);
    }
    Ok(())
}

fn report_error<W: Write>(err: &mut W, line_number: u64) -> io::Result<()> {
    writeln!(err, "ERROR {}", line_number)
}

/// `routeId;cityA;length;year;cityB;...;cityK` — at least one segment,
/// `fields.len() == 3n + 1` for `n >= 1` segments.
fn handle_route_declaration(map: &mut RoadMap, route_id: u32, args: &[&str]) -> bool {
    if args.len() < 4 || (args.len() - 1) % 3 != 0 {
        return false;
    }
    let first_city = args[0];
    let waypoints: Vec<RouteSegment> = args[1..]
        .chunks(3)
        .map(|chunk| RouteSegment {
            city: chunk[2].to_string(),
            length: parse_length(chunk[0]),
            year: parse_year(chunk[1]),
        })
        .collect();
    map.declare_route(route_id, first_city, &waypoints)
}

fn handle_named_command<W1: Write>(
    map: &mut RoadMap,
    command: &str,
    args: &[&str],
    out: &mut W1,
) -> io::Result<bool> {
    let ok = match command {
        "addRoad" => args.len() == 4 && map.add_road(args[0], args[1], parse_length(args[2]), parse_year(args[3])),
        "removeRoad" => args.len() == 2 && map.remove_road(args[0], args[1]),
        "repairRoad" => {
            let year = if args.len() == 3 { parse_year(args[2]) } else { 0 };
            args.len() == 3 && year != 0 && map.repair_road(args[0], args[1], year)
        }
        "newRoute" => {
            let route_id = if args.len() == 3 { parse_route_id_loose(args[0]) } else { 0 };
            args.len() == 3
                && (1..1000).contains(&route_id)
                && map.new_route(route_id, args[1], args[2])
        }
        "removeRoute" => {
            let route_id = if args.len() == 1 { parse_route_id_loose(args[0]) } else { 0 };
            args.len() == 1 && map.remove_route(route_id)
        }
        "extendRoute" => {
            let route_id = if args.len() == 2 { parse_route_id_loose(args[0]) } else { 0 };
            args.len() == 2 && map.extend_route(route_id, args[1])
        }
        "getRouteDescription" => {
            return handle_get_route_description(map, args, out);
        }
        _ => false,
    };
    Ok(ok)
}

fn handle_get_route_description<W1: Write>(map: &RoadMap, args: &[&str], out: &mut W1) -> io::Result<bool> {
    if args.len() != 1 {
        return Ok(false);
    }
    let route_id = match parse_nonnegative_route_id(args[0]) {
        Some(id) => id,
        None => return Ok(false),
    };
    let description = map.get_route_description(route_id);
    writeln!(out, "{}", description)?;
    Ok(true)
}

/// An optional leading `-` followed by one or more decimal digits. An empty
/// string is always invalid.
fn is_valid_number(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_checked_i64(s: &str) -> Option<i64> {
    if !is_valid_number(s) {
        return None;
    }
    s.parse::<i64>().ok()
}

/// `0` doubles as "invalid" and "actually zero" — both are rejected by
/// every caller, so the two cases never need to be told apart.
fn parse_length(s: &str) -> u32 {
    match parse_checked_i64(s) {
        Some(v) if (0..=u32::MAX as i64).contains(&v) => v as u32,
        _ => 0,
    }
}

fn parse_year(s: &str) -> i32 {
    match parse_checked_i64(s) {
        Some(v) if (i32::MIN as i64..=i32::MAX as i64).contains(&v) => v as i32,
        _ => 0,
    }
}

/// Any syntactically valid non-negative number up to `u32::MAX`, regardless
/// of whether it names a usable route id.
fn parse_route_id_loose(s: &str) -> u32 {
    match parse_checked_i64(s) {
        Some(v) if (0..=u32::MAX as i64).contains(&v) => v as u32,
        _ => 0,
    }
}

/// `getRouteDescription`'s argument is validated more strictly than the
/// other numeric fields: a leading `-` is rejected even before range
/// checking.
fn parse_nonnegative_route_id(s: &str) -> Option<u32> {
    if !is_valid_number(s) || s.starts_with('-') {
        return None;
    }
    let v: i64 = s.parse().ok()?;
    if v > u32::MAX as i64 {
        return None;
    }
    Some(v as u32)
}
