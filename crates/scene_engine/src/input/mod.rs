//! Viewer input handling
//!
//! The window toolkit delivers raw mouse and key events; this module turns them into
//! a model transform and a small set of viewer commands.
//!
//! - Left drag spins the model (x spin from vertical motion, y spin from horizontal)
//! - Right drag translates the model in x/y
//! - The wheel moves the model along z
//! - W/S switch wireframe/fill, F/N fullscreen/windowed, 1-5 choose the texture map,
//!   Escape quits

use bitflags::bitflags;

use crate::assets::materials::TextureSlot;
use crate::core::config::ControlsConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::render::backend::PolygonMode;

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Right button
    Right,
    /// Middle button
    Middle,
}

bitflags! {
    /// Set of mouse buttons currently held
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons: u8 {
        /// Left button held
        const LEFT = 0b001;
        /// Right button held
        const RIGHT = 0b010;
        /// Middle button held
        const MIDDLE = 0b100;
    }
}

impl From<MouseButton> for MouseButtons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::LEFT,
            MouseButton::Right => Self::RIGHT,
            MouseButton::Middle => Self::MIDDLE,
        }
    }
}

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// S key
    S,
    /// F key
    F,
    /// N key
    N,
    /// 1 key
    Key1,
    /// 2 key
    Key2,
    /// 3 key
    Key3,
    /// 4 key
    Key4,
    /// 5 key
    Key5,
    /// Escape key
    Escape,
    /// Any other key
    Other,
}

/// Something the viewer should do in response to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Exit the event loop
    Quit,
    /// Change rasterisation
    SetPolygonMode(PolygonMode),
    /// Switch between fullscreen (`true`) and windowed
    SetFullscreen(bool),
    /// Bind this texture map when drawing
    SelectTextureMap(TextureSlot),
}

/// Map a key press to a viewer command
pub fn command_for_key(key: KeyCode) -> Option<ViewerCommand> {
    let command = match key {
        KeyCode::Escape => ViewerCommand::Quit,
        KeyCode::W => ViewerCommand::SetPolygonMode(PolygonMode::Line),
        KeyCode::S => ViewerCommand::SetPolygonMode(PolygonMode::Fill),
        KeyCode::F => ViewerCommand::SetFullscreen(true),
        KeyCode::N => ViewerCommand::SetFullscreen(false),
        KeyCode::Key1 => ViewerCommand::SelectTextureMap(TextureSlot::Ambient),
        KeyCode::Key2 => ViewerCommand::SelectTextureMap(TextureSlot::Diffuse),
        KeyCode::Key3 => ViewerCommand::SelectTextureMap(TextureSlot::MapBump),
        KeyCode::Key4 => ViewerCommand::SelectTextureMap(TextureSlot::Bump),
        KeyCode::Key5 => ViewerCommand::SelectTextureMap(TextureSlot::Dissolve),
        KeyCode::Other => return None,
    };
    Some(command)
}

/// Mouse-driven model transform
#[derive(Debug, Clone)]
pub struct MouseControls {
    settings: ControlsConfig,
    buttons: MouseButtons,
    rotate: bool,
    translate: bool,
    orig: (f32, f32),
    orig_pos: (f32, f32),
    /// Spin about the x axis, degrees
    pub spin_x: f32,
    /// Spin about the y axis, degrees
    pub spin_y: f32,
    /// Model translation
    pub model_position: Vec3,
}

impl Default for MouseControls {
    fn default() -> Self {
        Self::new(ControlsConfig::default())
    }
}

impl MouseControls {
    /// Create controls with the given sensitivities
    pub fn new(settings: ControlsConfig) -> Self {
        Self {
            settings,
            buttons: MouseButtons::empty(),
            rotate: false,
            translate: false,
            orig: (0.0, 0.0),
            orig_pos: (0.0, 0.0),
            spin_x: 0.0,
            spin_y: 0.0,
            model_position: Vec3::zeros(),
        }
    }

    /// Buttons currently held
    pub fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    /// A button went down at `(x, y)`
    pub fn mouse_press(&mut self, button: MouseButton, x: f32, y: f32) {
        self.buttons.insert(button.into());
        match button {
            MouseButton::Left => {
                self.orig = (x, y);
                self.rotate = true;
            }
            MouseButton::Right => {
                self.orig_pos = (x, y);
                self.translate = true;
            }
            MouseButton::Middle => {}
        }
    }

    /// A button went up
    pub fn mouse_release(&mut self, button: MouseButton) {
        self.buttons.remove(button.into());
        match button {
            MouseButton::Left => self.rotate = false,
            MouseButton::Right => self.translate = false,
            MouseButton::Middle => {}
        }
    }

    /// The pointer moved to `(x, y)`
    ///
    /// Drags only apply while exactly one of left or right is held. Returns whether
    /// the transform changed.
    pub fn mouse_move(&mut self, x: f32, y: f32) -> bool {
        if self.rotate && self.buttons == MouseButtons::LEFT {
            let (dx, dy) = (x - self.orig.0, y - self.orig.1);
            self.spin_x += self.settings.rotation_sensitivity * dy;
            self.spin_y += self.settings.rotation_sensitivity * dx;
            self.orig = (x, y);
            true
        } else if self.translate && self.buttons == MouseButtons::RIGHT {
            let (dx, dy) = (x - self.orig_pos.0, y - self.orig_pos.1);
            self.model_position.x += self.settings.translate_increment * dx;
            self.model_position.y -= self.settings.translate_increment * dy;
            self.orig_pos = (x, y);
            true
        } else {
            false
        }
    }

    /// The wheel turned; only the sign of `delta` matters
    pub fn wheel(&mut self, delta: f32) -> bool {
        if delta > 0.0 {
            self.model_position.z += self.settings.zoom_step;
        } else if delta < 0.0 {
            self.model_position.z -= self.settings.zoom_step;
        } else {
            return false;
        }
        true
    }

    /// Model transform: spin about y, then x, then translate
    pub fn global_transform(&self) -> Mat4 {
        let rot_x = Mat4::rotation_x(utils::deg_to_rad(self.spin_x));
        let rot_y = Mat4::rotation_y(utils::deg_to_rad(self.spin_y));
        let mut transform = rot_x * rot_y;
        transform[(0, 3)] = self.model_position.x;
        transform[(1, 3)] = self.model_position.y;
        transform[(2, 3)] = self.model_position.z;
        transform
    }
}
