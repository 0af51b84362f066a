//! Demo scene
//!
//! A 1280×1024 canvas with two boxes chasing a pointer that circles the
//! middle of the screen. Each box eases toward the pointer at its own rate
//! and fades in from transparent; the first one carries two small boxes
//! and a label, the second only a label.

use anyhow::Result;

use lumen_core::Color;
use lumen_layout::{Element, Style};

const CANVAS_WIDTH: f32 = 1280.0;
const CANVAS_HEIGHT: f32 = 1024.0;
const POINTER_RADIUS: f32 = 300.0;
const POINTER_STEP: f32 = 0.05;

/// A value that moves a fixed fraction of the way to its target per frame
#[derive(Clone, Copy, Debug, PartialEq)]
struct Eased {
    value: f32,
    rate: f32,
}

impl Eased {
    fn new(value: f32, rate: f32) -> Self {
        Self { value, rate }
    }

    fn step(&mut self, target: f32) -> f32 {
        self.value += (target - self.value) * self.rate;
        self.value
    }
}

/// A box that follows the pointer
#[derive(Clone, Debug)]
struct Chaser {
    color: Color,
    size: f32,
    left: Eased,
    top: Eased,
    opacity: Eased,
    with_swatches: bool,
}

impl Chaser {
    fn new(color: &str, rate: f32, with_swatches: bool) -> Result<Self> {
        Ok(Self {
            color: color.parse()?,
            size: 150.0,
            left: Eased::new(0.0, rate),
            top: Eased::new(0.0, rate),
            opacity: Eased::new(0.0, rate),
            with_swatches,
        })
    }

    fn step(&mut self, pointer: (f32, f32)) {
        self.left.step(pointer.0);
        self.top.step(pointer.1);
        self.opacity.step(1.0);
    }

    fn element(&self, swatches: &[Color; 2]) -> Element {
        let half = self.size / 2.0;
        let mut element = Element::rect().style(
            Style::new()
                .absolute()
                .size(self.size, self.size)
                .left(self.left.value - half)
                .top(self.top.value - half)
                .opacity(self.opacity.value)
                .bg(self.color),
        );
        if self.with_swatches {
            element = element.children(
                swatches
                    .iter()
                    .map(|color| Element::rect().style(Style::new().size(50.0, 50.0).bg(*color))),
            );
        }
        element.child(Element::text("haha"))
    }
}

/// The animated demo
#[derive(Clone, Debug)]
pub struct DemoScene {
    chasers: Vec<Chaser>,
    swatches: [Color; 2],
    frame: u64,
}

impl DemoScene {
    pub fn new() -> Result<Self> {
        Ok(Self {
            chasers: vec![
                Chaser::new("pink", 0.2, true)?,
                Chaser::new("orange", 0.1, false)?,
            ],
            swatches: ["darkblue".parse()?, "black".parse()?],
            frame: 0,
        })
    }

    /// Where the pointer is on the current frame
    pub fn pointer(&self) -> (f32, f32) {
        let angle = self.frame as f32 * POINTER_STEP;
        (
            CANVAS_WIDTH / 2.0 + POINTER_RADIUS * angle.cos(),
            CANVAS_HEIGHT / 2.0 + POINTER_RADIUS * angle.sin(),
        )
    }

    /// Advance the animation by one frame
    pub fn advance(&mut self) {
        self.frame += 1;
        let pointer = self.pointer();
        for chaser in &mut self.chasers {
            chaser.step(pointer);
        }
    }

    /// Element tree for the current frame
    pub fn element(&self) -> Element {
        Element::rect()
            .style(Style::new().size(CANVAS_WIDTH, CANVAS_HEIGHT))
            .children(self.chasers.iter().map(|c| c.element(&self.swatches)))
    }
}
