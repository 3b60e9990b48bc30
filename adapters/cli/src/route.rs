//! Route planning and sweeping for a single scenario.

use anyhow::{bail, Context, Result};
use log::{debug, info};
use rally_core::{CellCoord, Int, Line, Matrix, Pt};
use rally_level_generation::ArenaParams;
use rally_system_collision::ObstacleField;
use rally_system_pathfinding::{Navigator, WalkabilityGrid};
use serde::Serialize;

use crate::{arena_code, config::ScenarioConfig};

/// Resolved inputs of a route query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RouteSettings {
    cell_size: Int,
    diameter: Int,
    start: Option<CellCoord>,
    end: Option<CellCoord>,
    sweep: bool,
}

impl RouteSettings {
    pub(crate) fn from_config(config: &ScenarioConfig) -> Result<Self> {
        Ok(Self {
            cell_size: Int::from_units(config.arena.cell_size)
                .context("cell_size is out of range")?,
            diameter: Int::from_units(config.body.diameter)
                .context("body diameter is out of range")?,
            start: config.query.start_cell(),
            end: config.query.end_cell(),
            sweep: config.query.sweep,
        })
    }
}

/// Contact found while sweeping the body along the planned route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct SweepContact {
    /// Index of the route segment, starting at zero.
    pub(crate) segment: usize,
    /// Arena cell of the obstacle that was touched.
    pub(crate) obstacle: CellCoord,
    /// Body center at first contact.
    pub(crate) point: Pt,
    /// Outward normal at the contact.
    pub(crate) normal: Pt,
}

/// Outcome of a route query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct RouteReport {
    /// Share code of the arena the route was planned in.
    pub(crate) arena_code: String,
    /// Arena cell the route starts from.
    pub(crate) start: CellCoord,
    /// Arena cell the route ends at.
    pub(crate) end: CellCoord,
    /// Walkability cells visited, empty when the end is unreachable.
    pub(crate) route: Vec<CellCoord>,
    /// World positions of the body's center along the route.
    pub(crate) waypoints: Vec<Pt>,
    /// Contacts found by the sweep, empty when sweeping is disabled.
    pub(crate) contacts: Vec<SweepContact>,
}

impl RouteReport {
    /// Number of steps along the route, `None` when unreachable.
    pub(crate) fn steps(&self) -> Option<usize> {
        self.route.len().checked_sub(1)
    }
}

/// Plans the route described by `settings` through `arena`.
pub(crate) fn plan(arena: &Matrix, settings: &RouteSettings) -> Result<RouteReport> {
    let spawns = ArenaParams {
        columns: arena.columns(),
        rows: arena.rows(),
        ..ArenaParams::default()
    }
    .spawn_cells();
    let start = settings.start.unwrap_or(spawns[0]);
    let end = settings.end.unwrap_or(spawns[3]);

    let walkability = WalkabilityGrid::derive(arena, settings.cell_size, settings.diameter)
        .context("failed to derive walkable cells")?;
    let fine_start = resting_cell(&walkability, arena, start).context("invalid route start")?;
    let fine_end = resting_cell(&walkability, arena, end).context("invalid route end")?;

    let mut navigator = Navigator::new(walkability.grid());
    let mut route = Vec::new();
    navigator.find_path(fine_start, fine_end, &mut route);
    if route.is_empty() {
        info!("no route from {start:?} to {end:?}");
    }

    let waypoints = route
        .iter()
        .map(|cell| walkability.cell_center(*cell))
        .collect::<Result<Vec<_>, _>>()
        .context("route waypoint out of range")?;

    let contacts = if settings.sweep {
        sweep_route(arena, settings, &waypoints)?
    } else {
        Vec::new()
    };

    Ok(RouteReport {
        arena_code: arena_code::encode(arena),
        start,
        end,
        route,
        waypoints,
        contacts,
    })
}

/// First walkability cell inside arena cell `cell` where the body fits.
fn resting_cell(
    walkability: &WalkabilityGrid,
    arena: &Matrix,
    cell: CellCoord,
) -> Result<CellCoord> {
    if !arena.contains(cell) {
        bail!(
            "cell ({}, {}) lies outside the {}x{} arena",
            cell.column(),
            cell.row(),
            arena.columns(),
            arena.rows()
        );
    }

    let column = cell.column() * 2;
    let row = cell.row() * 2;
    let candidates = [
        CellCoord::new(column, row),
        CellCoord::new(column + 1, row),
        CellCoord::new(column, row + 1),
        CellCoord::new(column + 1, row + 1),
    ];
    match candidates
        .into_iter()
        .find(|candidate| walkability.is_walkable(*candidate))
    {
        Some(resting) => Ok(resting),
        None => bail!(
            "body does not fit inside cell ({}, {})",
            cell.column(),
            cell.row()
        ),
    }
}

fn sweep_route(
    arena: &Matrix,
    settings: &RouteSettings,
    waypoints: &[Pt],
) -> Result<Vec<SweepContact>> {
    let field = ObstacleField::from_grid(arena, settings.cell_size)
        .context("arena does not fit world coordinates")?;
    let blocked: Vec<CellCoord> = arena.coords().filter(|cell| arena.is_blocked(*cell)).collect();

    let mut contacts = Vec::new();
    for (segment, pair) in waypoints.windows(2).enumerate() {
        let travel = Line::new(pair[0], pair[1]);
        let Some(hit) = field
            .sweep(travel, settings.diameter)
            .with_context(|| format!("sweep of segment {segment} overflowed"))?
        else {
            continue;
        };

        let obstacle = blocked
            .get(hit.obstacle)
            .copied()
            .context("sweep reported an obstacle outside the arena")?;
        contacts.push(SweepContact {
            segment,
            obstacle,
            point: hit.contact.point,
            normal: hit.contact.normal,
        });
    }

    debug!(
        "swept {} segments, {} contacts",
        waypoints.len().saturating_sub(1),
        contacts.len()
    );
    Ok(contacts)
}

/// Renders the arena with the route overlaid, one character per arena cell.
///
/// `#` marks obstacles, `*` the route, `S` and `E` its ends and `!` cells
/// whose obstacle the sweep touched.
pub(crate) fn render_ascii(arena: &Matrix, report: &RouteReport) -> String {
    let width = arena.columns() as usize;
    let mut canvas: Vec<Vec<char>> = (0..arena.rows())
        .map(|row| {
            (0..arena.columns())
                .map(|column| {
                    if arena.is_blocked(CellCoord::new(column, row)) {
                        '#'
                    } else {
                        '.'
                    }
                })
                .collect()
        })
        .collect();

    let mut mark = |cell: CellCoord, glyph: char| {
        if let Some(slot) = canvas
            .get_mut(cell.row() as usize)
            .and_then(|row| row.get_mut(cell.column() as usize))
        {
            *slot = glyph;
        }
    };
    for fine in &report.route {
        mark(CellCoord::new(fine.column() / 2, fine.row() / 2), '*');
    }
    for contact in &report.contacts {
        mark(contact.obstacle, '!');
    }
    mark(report.start, 'S');
    mark(report.end, 'E');

    let mut out = String::with_capacity((width + 1) * canvas.len() + 128);
    for row in canvas {
        out.extend(row);
        out.push('\n');
    }
    out.push_str(&format!("arena: {}\n", report.arena_code));
    match report.steps() {
        Some(steps) => out.push_str(&format!(
            "route: {steps} steps from ({}, {}) to ({}, {})\n",
            report.start.column(),
            report.start.row(),
            report.end.column(),
            report.end.row()
        )),
        None => out.push_str("route: unreachable\n"),
    }
    out.push_str(&format!("contacts: {}\n", report.contacts.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(diameter: i64) -> RouteSettings {
        RouteSettings {
            cell_size: Int::from_units(10).expect("fits"),
            diameter: Int::from_units(diameter).expect("fits"),
            start: None,
            end: None,
            sweep: true,
        }
    }

    fn corridor() -> Matrix {
        Matrix::from_rows(&[
            [1_i64, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1],
        ])
        .expect("grid")
    }

    #[test]
    fn default_endpoints_are_spawn_corners() {
        let report = plan(&corridor(), &settings(4)).expect("plan");
        assert_eq!(report.start, CellCoord::new(1, 1));
        assert_eq!(report.end, CellCoord::new(4, 3));
        assert!(report.steps().is_some());
        assert_eq!(report.waypoints.len(), report.route.len());
    }

    #[test]
    fn straight_corridor_route_never_touches_walls() {
        let arena = Matrix::from_rows(&[
            [1_i64, 1, 1, 1, 1],
            [1, 0, 0, 0, 1],
            [1, 1, 1, 1, 1],
        ])
        .expect("grid");
        let mut request = settings(4);
        request.end = Some(CellCoord::new(3, 1));

        let report = plan(&arena, &request).expect("plan");
        assert_eq!(report.steps(), Some(4));
        assert_eq!(report.contacts, Vec::new());
    }

    #[test]
    fn sweep_flags_diagonal_cut_past_obstacle_corner() {
        let report = plan(&corridor(), &settings(4)).expect("plan");
        assert!(report
            .contacts
            .iter()
            .any(|contact| contact.obstacle == CellCoord::new(3, 2)));
        for contact in &report.contacts {
            assert!(contact.segment + 1 < report.route.len());
        }

        let mut quiet = settings(4);
        quiet.sweep = false;
        assert!(plan(&corridor(), &quiet).expect("plan").contacts.is_empty());
    }

    #[test]
    fn blocked_endpoint_is_reported() {
        let mut request = settings(4);
        request.end = Some(CellCoord::new(0, 0));
        let error = plan(&corridor(), &request).expect_err("wall cell");
        assert!(format!("{error:#}").contains("does not fit"));

        request.end = Some(CellCoord::new(9, 9));
        let error = plan(&corridor(), &request).expect_err("outside arena");
        assert!(format!("{error:#}").contains("outside"));
    }

    #[test]
    fn sealed_room_is_unreachable() {
        let arena = Matrix::from_rows(&[
            [1_i64, 1, 1, 1, 1],
            [1, 0, 1, 0, 1],
            [1, 1, 1, 1, 1],
        ])
        .expect("grid");
        let mut request = settings(4);
        request.end = Some(CellCoord::new(3, 1));

        let report = plan(&arena, &request).expect("plan");
        assert_eq!(report.steps(), None);
        assert!(render_ascii(&arena, &report).contains("route: unreachable"));
    }

    #[test]
    fn ascii_marks_route_and_endpoints() {
        let arena = corridor();
        let report = plan(&arena, &settings(4)).expect("plan");
        let rendered = render_ascii(&arena, &report);
        let rows: Vec<&str> = rendered.lines().collect();

        assert_eq!(rows[0], "######");
        assert!(rows[1].starts_with("#S"));
        assert_eq!(rows[2], "###!*#");
        assert!(rows[3].ends_with("E#"));
        assert!(rendered.contains(&report.arena_code));
    }
}
