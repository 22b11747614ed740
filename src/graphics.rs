use fieldsim_kinematics::units::{
    CANVAS_HEIGHT_PX, CANVAS_WIDTH_PX, to_inertial_rad, to_px, to_pxx, to_pxy,
};
use fieldsim_kinematics::{Robot, WheelTelemetry};
use macroquad::prelude::*;
use tracing::{info, warn};

use crate::field::{Field, FieldSet};
use crate::input::{GamepadAxes, InputSnapshot, Key};
use crate::sim::{Mode, Simulator};

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "Field Drive Simulator".to_string(),
        window_width: CANVAS_WIDTH_PX as i32,
        window_height: CANVAS_HEIGHT_PX as i32,
        high_dpi: true,
        window_resizable: false,
        ..Default::default()
    }
}

const KEY_BINDINGS: [(KeyCode, Key); 12] = [
    (KeyCode::W, Key::W),
    (KeyCode::A, Key::A),
    (KeyCode::S, Key::S),
    (KeyCode::D, Key::D),
    (KeyCode::Q, Key::Q),
    (KeyCode::E, Key::E),
    (KeyCode::H, Key::H),
    (KeyCode::F, Key::F),
    (KeyCode::T, Key::T),
    (KeyCode::P, Key::P),
    (KeyCode::Left, Key::Left),
    (KeyCode::Right, Key::Right),
];

const TILE_IN: f64 = 24.0;
const TELEMETRY_FONT: f32 = 20.0;
const TELEMETRY_LINE: f32 = 25.0;

/// Keys held right now, plus the gamepad sticks if a pad is connected.
pub fn capture_input(gamepad: Option<GamepadAxes>) -> InputSnapshot {
    let held = KEY_BINDINGS
        .iter()
        .filter(|(code, _)| is_key_down(*code))
        .map(|(_, key)| *key);
    InputSnapshot::new(held, gamepad)
}

/// Load every field image up front, indexed like the field set. A field
/// whose image is missing renders as a plain tiled floor.
pub async fn load_field_textures(fields: &FieldSet) -> Vec<Option<Texture2D>> {
    let mut textures = Vec::with_capacity(fields.len());
    for field in fields.iter() {
        let texture = match field.image().and_then(|p| p.to_str()) {
            Some(path) => match load_texture(path).await {
                Ok(texture) => {
                    info!(field = field.name(), path, "Field image loaded");
                    Some(texture)
                }
                Err(e) => {
                    let name = field.name();
                    warn!(field = name, path, error = %e, "Field image unavailable");
                    None
                }
            },
            None => None,
        };
        textures.push(texture);
    }
    textures
}

pub fn draw_frame(sim: &Simulator, textures: &[Option<Texture2D>]) {
    let side = screen_width().min(screen_height()) as f64;
    let scale = (side / CANVAS_WIDTH_PX) as f32;

    clear_background(BLACK);
    let texture = textures.get(sim.fields().index()).and_then(Option::as_ref);
    draw_field(sim.field(), texture, scale);
    draw_chassis(sim.robot(), scale);
    if sim.show_telemetry() {
        draw_telemetry(sim, scale);
    }
}

fn draw_field(field: &Field, texture: Option<&Texture2D>, scale: f32) {
    let side = CANVAS_WIDTH_PX as f32 * scale;
    if let Some(texture) = texture {
        draw_texture_ex(
            texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(side, side)),
                ..Default::default()
            },
        );
        return;
    }

    let floor = Color::from_rgba(0x4a, 0x4a, 0x4a, 0xff);
    draw_rectangle(0.0, 0.0, side, side, floor);
    let tile = to_px(TILE_IN) as f32 * scale;
    let mut offset = tile;
    while offset < side {
        draw_line(offset, 0.0, offset, side, 1.0, DARKGRAY);
        draw_line(0.0, offset, side, offset, 1.0, DARKGRAY);
        offset += tile;
    }
    for o in field.obstacles() {
        draw_rectangle(
            o.x as f32 * scale,
            o.y as f32 * scale,
            o.w as f32 * scale,
            o.h as f32 * scale,
            Color::from_rgba(0x30, 0x30, 0x30, 0xff),
        );
    }
}

fn draw_chassis(robot: &Robot, scale: f32) {
    let pose = robot.pose();
    let chassis = robot.chassis();
    let color = match robot {
        Robot::Tank(_) => Color::from_rgba(0x96, 0x96, 0x96, 0xff),
        Robot::Mecanum(_) => Color::from_rgba(0x1d, 0x64, 0x08, 0xd7),
    };

    let cx = to_pxx(pose.x) as f32 * scale;
    let cy = to_pxy(pose.y) as f32 * scale;
    let w = to_px(chassis.width) as f32 * scale;
    let h = to_px(chassis.height) as f32 * scale;
    let rotation = to_inertial_rad(pose.heading) as f32;

    draw_rectangle_ex(
        cx,
        cy,
        w,
        h,
        DrawRectangleParams {
            offset: vec2(0.5, 0.5),
            rotation,
            color,
        },
    );
    // heading marker from the center to the front edge
    let tip_x = cx + rotation.cos() * w / 2.0;
    let tip_y = cy + rotation.sin() * w / 2.0;
    draw_line(cx, cy, tip_x, tip_y, 2.0, BLACK);
}

fn draw_telemetry(sim: &Simulator, scale: f32) {
    let robot = sim.robot();
    let pose = robot.pose();
    let limits = robot.limits();

    let mut lines = vec![
        format!("{:?}", sim.active()),
        format!("θ: {:.2}", pose.heading),
        format!("X: {:.2}", pose.x),
        format!("Y: {:.2}", pose.y),
    ];
    match robot.wheels() {
        WheelTelemetry::Tank(w) => {
            lines.push(format!("vL: {:.2}", w.left));
            lines.push(format!("vR: {:.2}", w.right));
            lines.push(format!("a: {:.2}", limits.max_accel));
        }
        WheelTelemetry::Mecanum(w) => {
            lines.push(format!("FL: {:.2}", w.front_left));
            lines.push(format!("FR: {:.2}", w.front_right));
            lines.push(format!("RL: {:.2}", w.rear_left));
            lines.push(format!("RR: {:.2}", w.rear_right));
            lines.push(format!("Velo: {:.2}", limits.max_speed));
            lines.push(format!("Accel: {:.2}", limits.max_accel));
            lines.push(format!("Decel: {:.2}", limits.max_decel));
        }
    }
    if let Mode::PathFollow { follower, .. } = sim.mode() {
        let elapsed = follower.elapsed();
        let total = follower.trajectory().total_time();
        lines.push(format!("Path: {elapsed:.2} / {total:.2} s"));
    }
    lines.push(sim.field().name().to_string());

    for (i, line) in lines.iter().enumerate() {
        let baseline = (20.0 + TELEMETRY_FONT * 0.8 + i as f32 * TELEMETRY_LINE) * scale;
        draw_text(line, 20.0 * scale, baseline, TELEMETRY_FONT * scale, WHITE);
    }
}
