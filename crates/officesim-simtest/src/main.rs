//! OfficeSim Headless Simulation Harness
//!
//! Validates layout data, pathing, seating, agent lifecycles and the editor
//! end to end. Runs entirely in-process with no renderer and no host.
//!
//! Usage:
//!   cargo run -p officesim-simtest
//!   cargo run -p officesim-simtest -- --verbose

use std::collections::HashSet;

use officesim_core::components::{BubbleKind, CharacterState};
use officesim_core::engine::OfficeSession;
use officesim_core::events::AgentEvent;
use officesim_core::persistence::load_snapshot;
use officesim_logic::config::OfficeConfig;
use officesim_logic::editor::EditTool;
use officesim_logic::grid::{tile_center, GridPos};
use officesim_logic::layout::{
    default_layout, parse_layout, serialize_layout, ExpandSide, LayoutError, TileKind,
};
use officesim_logic::pathfinding::{find_path, reachable_from};
use officesim_logic::seats::SeatRegistry;
use officesim_logic::tilemap::{blocked_tiles, walkable_tiles, TileMap};

// ── Default floor plan (same JSON a host ships) ─────────────────────────
const LAYOUT_JSON: &str = include_str!("../../../data/default_layout.json");

const FRAME_DT: f32 = 1.0 / 60.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== OfficeSim Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Layout data validation
    results.extend(validate_layout_data(verbose));

    // 2. Pathfinding over the default office
    results.extend(validate_pathfinding(verbose));

    // 3. Seat derivation
    results.extend(validate_seats(verbose));

    // 4. Agent lifecycle over simulated time
    results.extend(validate_agents(verbose));

    // 5. Bubbles
    results.extend(validate_bubbles(verbose));

    // 6. Editor flows
    results.extend(validate_editor(verbose));

    // 7. Snapshots and frame output
    results.extend(validate_persistence(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn run(session: &mut OfficeSession, seconds: f32) {
    let frames = (seconds / FRAME_DT) as u32;
    for _ in 0..frames {
        session.update(FRAME_DT);
    }
}

fn started(seed: u64) -> OfficeSession {
    let mut session = OfficeSession::new(OfficeConfig::seeded(seed));
    session.start(None);
    session
}

// ── 1. Layout Data ──────────────────────────────────────────────────────

fn validate_layout_data(verbose: bool) -> Vec<TestResult> {
    println!("--- Layout Data ---");
    let mut results = Vec::new();

    let shipped = match parse_layout(LAYOUT_JSON) {
        Ok(layout) => layout,
        Err(e) => {
            results.push(TestResult {
                name: "layout_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    let builtin = default_layout();
    results.push(TestResult {
        name: "layout_matches_builtin".into(),
        passed: shipped == builtin,
        detail: format!(
            "{}x{} grid, {} furniture items",
            shipped.cols,
            shipped.rows,
            shipped.furniture.len()
        ),
    });

    let roundtrip = serialize_layout(&builtin).and_then(|text| parse_layout(&text));
    results.push(TestResult {
        name: "layout_roundtrip".into(),
        passed: roundtrip.as_ref().is_ok_and(|l| *l == builtin),
        detail: "serialize then parse yields the same layout".into(),
    });

    let wrong_version = LAYOUT_JSON.replacen("\"version\": 1", "\"version\": 7", 1);
    results.push(TestResult {
        name: "layout_rejects_version".into(),
        passed: matches!(
            parse_layout(&wrong_version),
            Err(LayoutError::VersionMismatch { found: 7, .. })
        ),
        detail: "unknown layout version rejected".into(),
    });

    let border_is_wall = (0..builtin.cols as i32).all(|c| {
        builtin.tile(GridPos::new(c, 0)) == Some(TileKind::Wall)
            && builtin.tile(GridPos::new(c, builtin.rows as i32 - 1)) == Some(TileKind::Wall)
    });
    results.push(TestResult {
        name: "layout_walled_border".into(),
        passed: border_is_wall,
        detail: "top and bottom rows are wall".into(),
    });

    if verbose {
        let doorways = builtin.tiles.iter().filter(|t| **t == TileKind::Doorway).count();
        println!("  {} doorway cells", doorways);
    }

    results
}

// ── 2. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(verbose: bool) -> Vec<TestResult> {
    println!("--- Pathfinding ---");
    let mut results = Vec::new();

    let layout = default_layout();
    let map = TileMap::from_layout(&layout);
    let blocked = blocked_tiles(&layout);
    let walkable = walkable_tiles(&map, &blocked);

    let Some(&origin) = walkable.first() else {
        results.push(TestResult {
            name: "path_walkable_pool".into(),
            passed: false,
            detail: "no walkable cells".into(),
        });
        return results;
    };

    let reachable = reachable_from(origin, &map, &blocked);
    results.push(TestResult {
        name: "path_single_component".into(),
        passed: walkable.iter().all(|p| reachable.contains(p)),
        detail: format!("{}/{} walkable cells reachable", reachable.len(), walkable.len()),
    });

    // Sweep every walkable target from the origin: paths are contiguous,
    // walkable, and end where asked.
    let mut broken = 0;
    let mut longest = 0;
    for &target in &walkable {
        if target == origin {
            continue;
        }
        let path = find_path(origin, target, &map, &blocked);
        longest = longest.max(path.len());
        let mut prev = origin;
        let contiguous = path.iter().all(|&step| {
            let ok = step.manhattan(prev) == 1 && !blocked.contains(&step);
            prev = step;
            ok
        });
        if !contiguous || path.last() != Some(&target) {
            broken += 1;
        }
    }
    results.push(TestResult {
        name: "path_sweep_contiguous".into(),
        passed: broken == 0,
        detail: format!("{} broken paths, longest {} steps", broken, longest),
    });

    let wall = GridPos::new(0, 0);
    results.push(TestResult {
        name: "path_wall_target_empty".into(),
        passed: find_path(origin, wall, &map, &blocked).is_empty(),
        detail: "no path into a wall".into(),
    });

    if verbose {
        println!("  {} walkable cells, origin {:?}", walkable.len(), origin);
    }

    results
}

// ── 3. Seats ────────────────────────────────────────────────────────────

fn validate_seats(_verbose: bool) -> Vec<TestResult> {
    println!("--- Seats ---");
    let mut results = Vec::new();

    let layout = default_layout();
    let map = TileMap::from_layout(&layout);
    let blocked = blocked_tiles(&layout);
    let seats = SeatRegistry::from_layout(&layout, &map, &blocked);

    let desks = layout.furniture.iter().filter(|f| f.kind == "desk").count();
    results.push(TestResult {
        name: "seats_four_per_desk".into(),
        passed: seats.len() == desks * 4,
        detail: format!("{} seats for {} desks", seats.len(), desks),
    });

    let cells: HashSet<GridPos> = seats.iter().map(|s| s.pos()).collect();
    results.push(TestResult {
        name: "seats_distinct_cells".into(),
        passed: cells.len() == seats.len(),
        detail: "no two seats share a cell".into(),
    });

    let bad = seats
        .iter()
        .filter(|s| blocked.contains(&s.pos()) || map.get(s.pos()) == Some(TileKind::Wall))
        .count();
    results.push(TestResult {
        name: "seats_walkable".into(),
        passed: bad == 0,
        detail: format!("{} seats on blocked cells", bad),
    });

    let facing_desk = seats.iter().all(|s| {
        let front = s.pos().step(s.facing);
        layout
            .furniture_by_uid(&s.desk_uid)
            .is_some_and(|desk| desk.covers(front))
    });
    results.push(TestResult {
        name: "seats_face_desk".into(),
        passed: facing_desk,
        detail: "every seat faces its own desk".into(),
    });

    results
}

// ── 4. Agents ───────────────────────────────────────────────────────────

fn validate_agents(verbose: bool) -> Vec<TestResult> {
    println!("--- Agents ---");
    let mut results = Vec::new();

    let mut session = started(42);
    for id in 1..=6 {
        session.handle(&AgentEvent::Created { id });
    }
    session.handle(&AgentEvent::SubagentCreated {
        parent_id: 2,
        parent_tool_id: "task-a".into(),
    });
    session.handle(&AgentEvent::SubagentCreated {
        parent_id: 2,
        parent_tool_id: "task-b".into(),
    });
    run(&mut session, 40.0);

    let Some(office) = session.office() else {
        results.push(TestResult {
            name: "agents_session_running".into(),
            passed: false,
            detail: "session not running".into(),
        });
        return results;
    };

    results.push(TestResult {
        name: "agents_count".into(),
        passed: office.agent_count() == 8,
        detail: format!("{} characters (6 agents + 2 sub-agents)", office.agent_count()),
    });

    let mut seated = 0;
    for id in 1..=6 {
        let Some(ch) = office.character(id) else {
            continue;
        };
        let on_seat = ch
            .seat_id
            .as_deref()
            .and_then(|uid| office.seats().get(uid))
            .is_some_and(|seat| seat.pos() == ch.pos());
        if on_seat && ch.state == CharacterState::Type {
            seated += 1;
        }
    }
    results.push(TestResult {
        name: "agents_reach_seats".into(),
        passed: seated == 6,
        detail: format!("{}/6 active agents typing at their desks", seated),
    });

    let claimed: Vec<String> = office
        .agent_ids()
        .into_iter()
        .filter_map(|id| office.character(id).and_then(|ch| ch.seat_id.clone()))
        .collect();
    let unique: HashSet<&String> = claimed.iter().collect();
    results.push(TestResult {
        name: "agents_unique_seats".into(),
        passed: unique.len() == claimed.len(),
        detail: format!("{} seats claimed", claimed.len()),
    });

    // Go idle and wander for a while: nobody may stand on a blocked cell.
    for id in 1..=6 {
        session.handle(&AgentEvent::Active { id, active: false });
    }
    let mut off_grid = 0;
    for _ in 0..60 {
        run(&mut session, 0.5);
        if let Some(office) = session.office() {
            for id in office.agent_ids() {
                if let Some(ch) = office.character(id) {
                    if ch.state != CharacterState::Walk && office.blocked().contains(&ch.pos()) {
                        off_grid += 1;
                    }
                }
            }
        }
    }
    results.push(TestResult {
        name: "agents_wander_walkable".into(),
        passed: off_grid == 0,
        detail: format!("{} resting samples on blocked cells", off_grid),
    });

    session.handle(&AgentEvent::SubagentsCleared { parent_id: 2 });
    session.handle(&AgentEvent::Removed { id: 6 });
    let remaining = session.office().map_or(0, |o| o.agent_count());
    results.push(TestResult {
        name: "agents_removal".into(),
        passed: remaining == 5,
        detail: format!("{} characters after clearing sub-agents and removing one", remaining),
    });

    if verbose {
        if let Some(office) = session.office() {
            println!("  {} free seats left", office.seats().free_count());
        }
    }

    results
}

// ── 5. Bubbles ──────────────────────────────────────────────────────────

fn validate_bubbles(_verbose: bool) -> Vec<TestResult> {
    println!("--- Bubbles ---");
    let mut results = Vec::new();

    let mut session = started(7);
    session.handle(&AgentEvent::Created { id: 1 });
    session.handle(&AgentEvent::Created { id: 2 });
    session.handle(&AgentEvent::PermissionRequested { id: 1 });
    session.handle(&AgentEvent::Waiting { id: 2 });

    let waiting = session
        .office()
        .map_or(0.0, |o| o.config().waiting_bubble_duration);
    run(&mut session, waiting + 0.5);

    let (permission, waiting_gone) = session.office().map_or((None, false), |o| {
        (o.bubble(1).map(|b| b.kind), o.bubble(2).is_none())
    });
    results.push(TestResult {
        name: "bubble_permission_persists".into(),
        passed: permission == Some(BubbleKind::Permission),
        detail: "permission bubble outlives the waiting timeout".into(),
    });
    results.push(TestResult {
        name: "bubble_waiting_expires".into(),
        passed: waiting_gone,
        detail: format!("waiting bubble gone after {:.1}s", waiting + 0.5),
    });

    session.handle(&AgentEvent::PermissionCleared { id: 1 });
    results.push(TestResult {
        name: "bubble_permission_cleared".into(),
        passed: session.office().is_some_and(|o| o.bubble(1).is_none()),
        detail: "clearing removes the permission bubble".into(),
    });

    results
}

// ── 6. Editor ───────────────────────────────────────────────────────────

fn validate_editor(_verbose: bool) -> Vec<TestResult> {
    println!("--- Editor ---");
    let mut results = Vec::new();

    let mut session = started(3);
    session.handle(&AgentEvent::Created { id: 1 });
    session.set_edit_mode(true);
    let original = session.office().map(|o| o.layout().clone());

    // One paint stroke across three cells.
    session.select_tool(EditTool::TilePaint);
    session.editor.selected_tile_type = TileKind::Carpet;
    for col in 4..=6 {
        let (x, y) = tile_center(GridPos::new(col, 9));
        if col == 4 {
            session.pointer_down(x, y);
        } else {
            session.pointer_move(x, y);
        }
    }
    session.pointer_up();
    let painted = session.office().map_or(0, |o| {
        (4..=6)
            .filter(|&c| o.layout().tile(GridPos::new(c, 9)) == Some(TileKind::Carpet))
            .count()
    });
    results.push(TestResult {
        name: "editor_paint_stroke".into(),
        passed: painted == 3 && session.editor.undo_len() == 1,
        detail: format!("{} cells painted, {} undo entries", painted, session.editor.undo_len()),
    });

    // Place a plant, then try a second one on the same cell.
    session.select_tool(EditTool::FurniturePlace);
    session.editor.selected_furniture_type = "plant".into();
    let (px, py) = tile_center(GridPos::new(5, 5));
    session.pointer_down(px, py);
    session.pointer_up();
    session.pointer_down(px, py);
    session.pointer_up();
    let plants_at = session.office().map_or(0, |o| {
        o.layout()
            .furniture
            .iter()
            .filter(|f| f.covers(GridPos::new(5, 5)))
            .count()
    });
    results.push(TestResult {
        name: "editor_no_overlap".into(),
        passed: plants_at == 1,
        detail: format!("{} items cover the placement cell", plants_at),
    });

    session.expand(ExpandSide::Left);
    let seat_kept = session.office().is_some_and(|o| {
        o.character(1)
            .is_some_and(|ch| ch.seat_id.as_deref().is_some_and(|uid| o.seats().contains(uid)))
    });
    results.push(TestResult {
        name: "editor_expand_keeps_seat".into(),
        passed: seat_kept && session.office().is_some_and(|o| o.layout().cols == 21),
        detail: "growing the grid keeps seat assignments".into(),
    });

    while session.editor.undo_len() > 0 {
        session.undo();
    }
    let restored = session.office().map(|o| o.layout().clone());
    results.push(TestResult {
        name: "editor_undo_all".into(),
        passed: restored == original,
        detail: format!("{} redo entries after undoing everything", session.editor.redo_len()),
    });

    results
}

// ── 7. Persistence & Frames ─────────────────────────────────────────────

fn validate_persistence(_verbose: bool) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();

    let mut session = started(11);
    session.handle(&AgentEvent::Created { id: 1 });
    session.handle(&AgentEvent::Created { id: 2 });
    if let Some(office) = session.office_mut() {
        office.reassign_seat(2, "desk-6:right");
    }
    run(&mut session, 1.0);

    let mut bytes = Vec::new();
    let saved = session.save_snapshot(&mut bytes);
    let loaded = load_snapshot(&bytes[..]);
    results.push(TestResult {
        name: "snapshot_roundtrip".into(),
        passed: saved.is_ok() && loaded.as_ref().is_ok_and(|s| s.agents.len() == 2),
        detail: format!("{} bytes", bytes.len()),
    });

    if let Ok(snapshot) = loaded {
        let mut restored = OfficeSession::new(OfficeConfig::seeded(12));
        restored.restore(snapshot);
        restored.handle(&AgentEvent::Created { id: 2 });
        let seat = restored
            .office()
            .and_then(|o| o.character(2).and_then(|ch| ch.seat_id.clone()));
        results.push(TestResult {
            name: "snapshot_restores_seat".into(),
            passed: seat.as_deref() == Some("desk-6:right"),
            detail: format!("agent 2 seat after restore: {:?}", seat),
        });
    }

    let json = session.frame().map(|frame| serde_json::to_value(&frame));
    let characters = match &json {
        Some(Ok(value)) => value["characters"].as_array().map_or(0, |a| a.len()),
        _ => 0,
    };
    results.push(TestResult {
        name: "frame_json".into(),
        passed: characters == 2,
        detail: format!("{} characters in frame JSON", characters),
    });

    results
}
