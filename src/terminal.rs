// SPDX-License-Identifier: GPL-3.0-only

//! Terminal kiosk front-end
//!
//! Renders the application state to the terminal. Images (the last capture
//! and the gallery) are drawn with Unicode half-block characters for
//! improved vertical resolution. The live preview itself is shown by the
//! camera service on the display.

use crate::app::{
    App, AppState, ColorSlider, Message, OptionsRow, Panel, SettingsRow, ShutterSpeed,
};
use crate::backends::camera::{AwbMode, CameraService, CaptureReceiver};
use crate::constants::exposure::{ISO_VALUES, SHUTTER_SPEEDS};
use crate::constants::gallery::{COLUMNS, PAGE_SIZE};
use crate::constants::ui::{
    GRID_COLUMN_DIVISOR, GRID_LINES, GRID_ROW_DIVISOR, IMAGE_CACHE_SIZE, IMAGE_MAX_SIDE,
    POLL_INTERVAL, SLIDER_STEP,
};
use crate::constants::VERSION;
use crate::gallery::{GalleryPage, GalleryState, grid_position};

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbImage;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use std::collections::HashMap;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Run the terminal kiosk until the user quits
pub fn run<C: CameraService>(
    mut app: App<C>,
    mut completions: CaptureReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    if app.start().is_err() {
        info!("Continuing without camera");
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app, &mut completions);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.state().camera_ready {
        app.stop();
    }

    result
}

fn run_app<C: CameraService>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<C>,
    completions: &mut CaptureReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut images = ImageCache::default();

    loop {
        // Drain completions (non-blocking)
        while let Ok(outcome) = completions.try_recv() {
            app.update(Message::CaptureFinished(outcome));
        }
        app.update(Message::Tick(Instant::now()));

        if app.state().should_quit {
            break;
        }

        for path in visible_images(app.state()) {
            images.load(&path);
        }

        let now = Local::now();
        terminal.draw(|f| draw(f, app.state(), &images, now))?;

        // Handle input with timeout for completions and toast expiry
        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(message) = key_to_message(app.state(), key)
        {
            app.update(message);
        }
    }

    Ok(())
}

/// Translate a key press into a message for the current panel
pub fn key_to_message(state: &AppState, key: KeyEvent) -> Option<Message> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Message::Quit);
    }

    match &state.panel {
        Panel::None => match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(Message::Capture),
            KeyCode::Char('i') => Some(Message::OpenIsoMenu),
            KeyCode::Char('s') => Some(Message::OpenShutterMenu),
            KeyCode::Char('c') => Some(Message::OpenCustomShutter),
            KeyCode::Char('t') => Some(Message::OpenSettings),
            KeyCode::Char('g') => Some(Message::OpenGallery),
            KeyCode::Char('o') => Some(Message::OpenOptions),
            KeyCode::Esc | KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        },
        Panel::IsoMenu { selected } => menu_key(key, || {
            ISO_VALUES.get(*selected).map(|iso| Message::SelectIso(*iso))
        }),
        Panel::ShutterMenu { selected } => match key.code {
            KeyCode::Char('c') => Some(Message::OpenCustomShutter),
            _ => menu_key(key, || {
                SHUTTER_SPEEDS
                    .get(*selected)
                    .map(|(label, _)| Message::SelectShutter(label.to_string()))
            }),
        },
        Panel::CustomShutter { .. } => match key.code {
            KeyCode::Enter => Some(Message::ApplyCustomShutter),
            KeyCode::Esc => Some(Message::CancelCustomShutter),
            KeyCode::Backspace => Some(Message::CustomShutterBackspace),
            KeyCode::Char(c) if ShutterSpeed::accepts_char(c) => {
                Some(Message::CustomShutterInput(c))
            }
            _ => None,
        },
        Panel::Settings { selected } => {
            let row = SettingsRow::ALL.get(*selected).copied()?;
            match key.code {
                KeyCode::Char('r') => Some(Message::ResetSettings),
                KeyCode::Left => settings_step(state, row, -1),
                KeyCode::Right => settings_step(state, row, 1),
                KeyCode::Enter if row == SettingsRow::Reset => Some(Message::ResetSettings),
                _ => menu_key(key, || None),
            }
        }
        Panel::Gallery { .. } => match key.code {
            KeyCode::Char('n') | KeyCode::Right => Some(Message::GalleryNext),
            KeyCode::Char('b') | KeyCode::Left => Some(Message::GalleryPrevious),
            KeyCode::Char(c @ '1'..='9') => {
                let position = c.to_digit(10)? as usize - 1;
                Some(Message::GalleryOpen(position))
            }
            KeyCode::Backspace => Some(Message::GalleryBack),
            KeyCode::Esc => Some(Message::ClosePanel),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        },
        Panel::Options {
            folder_input: Some(input),
            ..
        } => match key.code {
            KeyCode::Enter => Some(Message::SetImageFolder(PathBuf::from(input.trim()))),
            KeyCode::Esc => Some(Message::CancelFolderEdit),
            KeyCode::Backspace => Some(Message::FolderBackspace),
            KeyCode::Char(c) => Some(Message::FolderInput(c)),
            _ => None,
        },
        Panel::Options {
            selected,
            folder_input: None,
        } => {
            let row = OptionsRow::ALL.get(*selected).copied()?;
            let format = state.config.capture_format;
            match (key.code, row) {
                (KeyCode::Enter, OptionsRow::ImageFolder) => Some(Message::EditImageFolder),
                (KeyCode::Enter | KeyCode::Right | KeyCode::Left, OptionsRow::CaptureFormat) => {
                    Some(Message::SetCaptureFormat(format.next()))
                }
                (KeyCode::Enter, OptionsRow::GridOverlay) => Some(Message::ToggleGridOverlay),
                (KeyCode::Enter, OptionsRow::Shutdown) => Some(Message::ShutdownSystem),
                _ => menu_key(key, || None),
            }
        }
    }
}

/// Shared keys of list panels; `on_enter` yields the selection message
fn menu_key(key: KeyEvent, on_enter: impl FnOnce() -> Option<Message>) -> Option<Message> {
    match key.code {
        KeyCode::Up => Some(Message::MoveSelection(-1)),
        KeyCode::Down => Some(Message::MoveSelection(1)),
        KeyCode::Enter => on_enter(),
        KeyCode::Esc => Some(Message::ClosePanel),
        KeyCode::Char('q') => Some(Message::Quit),
        _ => None,
    }
}

/// Message for a left/right press on a settings row
fn settings_step(state: &AppState, row: SettingsRow, direction: i32) -> Option<Message> {
    match row {
        SettingsRow::Slider(slider) => {
            let position =
                slider.position_of(state.settings.color_value(slider)) + direction * SLIDER_STEP;
            Some(match slider {
                ColorSlider::Saturation => Message::SetSaturation(position),
                ColorSlider::Contrast => Message::SetContrast(position),
                ColorSlider::Sharpness => Message::SetSharpness(position),
                ColorSlider::Brightness => Message::SetBrightness(position),
            })
        }
        SettingsRow::Awb => {
            let count = AwbMode::ALL.len() as i32;
            let index = (state.settings.awb_mode.index() as i32 + direction).rem_euclid(count);
            AwbMode::from_index(index as usize).map(Message::SetAwbMode)
        }
        SettingsRow::Reset => None,
    }
}

/// Images the next frame shows
fn visible_images(state: &AppState) -> Vec<PathBuf> {
    match &state.panel {
        Panel::Gallery { state: gallery, page } => match &gallery.viewing {
            Some(entry) => vec![entry.path.clone()],
            None => page.entries.iter().map(|entry| entry.path.clone()).collect(),
        },
        _ => state.last_capture.iter().cloned().collect(),
    }
}

/// Decoded, downscaled images keyed by path
///
/// An entry is re-decoded when the file size changes, so a reservation
/// placeholder that later receives data is picked up.
#[derive(Default)]
struct ImageCache {
    entries: HashMap<PathBuf, CachedImage>,
}

struct CachedImage {
    len: u64,
    /// `None` when the file could not be decoded
    image: Option<RgbImage>,
}

impl ImageCache {
    fn load(&mut self, path: &Path) {
        let len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if self.entries.get(path).is_some_and(|cached| cached.len == len) {
            return;
        }
        if self.entries.len() >= IMAGE_CACHE_SIZE {
            debug!("Image cache full, clearing");
            self.entries.clear();
        }
        let image = decode_image(path);
        self.entries
            .insert(path.to_path_buf(), CachedImage { len, image });
    }

    fn get(&self, path: &Path) -> Option<&RgbImage> {
        self.entries.get(path).and_then(|cached| cached.image.as_ref())
    }
}

fn decode_image(path: &Path) -> Option<RgbImage> {
    match image::open(path) {
        Ok(img) => Some(img.thumbnail(IMAGE_MAX_SIDE, IMAGE_MAX_SIDE).to_rgb8()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable image");
            None
        }
    }
}

fn draw(frame: &mut Frame, state: &AppState, images: &ImageCache, now: DateTime<Local>) {
    let area = frame.area();

    // Reserve bottom line for status
    let main_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };

    match &state.panel {
        Panel::Gallery { state: gallery, page } => {
            draw_gallery(frame, main_area, gallery, page, images);
        }
        panel => {
            let placeholder = if state.camera_ready {
                "No photo yet - press space to capture"
            } else {
                "Camera unavailable"
            };
            let image = state.last_capture.as_deref().and_then(|p| images.get(p));
            frame.render_widget(ImageWidget { image, placeholder }, main_area);
            if state.config.grid_overlay {
                frame.render_widget(GridOverlay, main_area);
            }
            draw_panel(frame, main_area, state, panel);
        }
    }

    if let Some(toast) = &state.toast {
        draw_toast(frame, main_area, &toast.message);
    }

    let status = StatusBar {
        state,
        now,
        capture_elapsed: state.capture.elapsed(Instant::now()),
    };
    frame.render_widget(status, status_area);
}

fn draw_panel(frame: &mut Frame, area: Rect, state: &AppState, panel: &Panel) {
    let (title, lines) = match panel {
        Panel::None | Panel::Gallery { .. } => return,
        Panel::IsoMenu { selected } => (
            "ISO",
            ISO_VALUES
                .iter()
                .enumerate()
                .map(|(i, iso)| menu_line(iso.to_string(), i == *selected))
                .collect::<Vec<_>>(),
        ),
        Panel::ShutterMenu { selected } => {
            let mut lines: Vec<Line> = SHUTTER_SPEEDS
                .iter()
                .enumerate()
                .map(|(i, (label, _))| menu_line(format!("{}s", label), i == *selected))
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from("c: custom"));
            ("Shutter speed", lines)
        }
        Panel::CustomShutter { input } => (
            "Custom shutter (seconds)",
            vec![
                Line::from(format!("> {}_", input)),
                Line::from(""),
                Line::from("Enter: apply  Esc: cancel"),
            ],
        ),
        Panel::Settings { selected } => (
            "Camera settings",
            SettingsRow::ALL
                .iter()
                .enumerate()
                .map(|(i, row)| menu_line(settings_row_text(state, *row), i == *selected))
                .collect(),
        ),
        Panel::Options {
            selected,
            folder_input,
        } => {
            let mut lines: Vec<Line> = OptionsRow::ALL
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let text = match (row, folder_input) {
                        (OptionsRow::ImageFolder, Some(input)) => format!("Image folder: {}_", input),
                        (OptionsRow::ImageFolder, None) => {
                            format!("Image folder: {}", state.config.image_folder.display())
                        }
                        (OptionsRow::CaptureFormat, _) => {
                            format!("Output format: {}", state.config.capture_format)
                        }
                        (OptionsRow::GridOverlay, _) => format!(
                            "Grid overlay: {}",
                            if state.config.grid_overlay { "on" } else { "off" }
                        ),
                        (OptionsRow::Shutdown, _) => "Shutdown System".to_string(),
                    };
                    menu_line(text, i == *selected)
                })
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from(format!("FotoPi v{}", VERSION)));
            ("Options", lines)
        }
    };

    let width = lines
        .iter()
        .map(|line| line.width() as u16)
        .max()
        .unwrap_or(0)
        .max(title.len() as u16)
        + 4;
    let popup = centered_rect(area, width, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        popup,
    );
}

fn menu_line(text: String, selected: bool) -> Line<'static> {
    if selected {
        Line::styled(text, Style::default().add_modifier(Modifier::REVERSED))
    } else {
        Line::from(text)
    }
}

fn settings_row_text(state: &AppState, row: SettingsRow) -> String {
    match row {
        SettingsRow::Slider(slider) => {
            let value = state.settings.color_value(slider);
            format!(
                "{:<11}{} {:>5.2}",
                slider.display_name(),
                slider_bar(slider, value, 20),
                value
            )
        }
        SettingsRow::Awb => format!("{:<11}< {} >", "AWB", state.settings.awb_mode.display_name()),
        SettingsRow::Reset => "Reset".to_string(),
    }
}

/// `[#####-----]` style bar for a slider value
fn slider_bar(slider: ColorSlider, value: f32, width: usize) -> String {
    let range = slider.range();
    let span = (range.end() - range.start()).max(1) as f32;
    let position = slider.position_of(value).clamp(*range.start(), *range.end());
    let filled = (((position - range.start()) as f32 / span) * width as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled.min(width)))
}

fn draw_gallery(
    frame: &mut Frame,
    area: Rect,
    gallery: &GalleryState,
    page: &GalleryPage,
    images: &ImageCache,
) {
    if let Some(entry) = &gallery.viewing {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(entry.label.as_str())
            .title_bottom("Backspace: back");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            ImageWidget {
                image: images.get(&entry.path),
                placeholder: "Cannot display image",
            },
            inner,
        );
        return;
    }

    let title = format!(
        "Gallery - page {}/{} ({} images)",
        page.page_index + 1,
        page.page_count().max(1),
        page.total
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_bottom("n: next  b: previous  1-9: open  Backspace: close");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if page.is_empty() {
        let msg = "No images on this page";
        frame.render_widget(ImageWidget { image: None, placeholder: msg }, inner);
        return;
    }

    let rows = PAGE_SIZE.div_ceil(COLUMNS) as u16;
    let cell_width = inner.width / COLUMNS as u16;
    let cell_height = inner.height / rows;

    for (position, entry) in page.entries.iter().enumerate() {
        // Unreadable images are skipped; their cell stays empty
        let Some(image) = images.get(&entry.path) else {
            continue;
        };
        let (row, column) = grid_position(position);
        let cell = Rect {
            x: inner.x + column as u16 * cell_width,
            y: inner.y + row as u16 * cell_height,
            width: cell_width,
            height: cell_height,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{}", position + 1))
            .title_bottom(entry.label.as_str());
        let image_area = block.inner(cell);
        frame.render_widget(block, cell);
        frame.render_widget(
            ImageWidget {
                image: Some(image),
                placeholder: "",
            },
            image_area,
        );
    }
}

fn draw_toast(frame: &mut Frame, area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let height = 3.min(area.height);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    };
    frame.render_widget(Clear, toast_area);
    frame.render_widget(
        Paragraph::new(message).block(Block::default().borders(Borders::ALL)),
        toast_area,
    );
}

/// `width` x `height` rectangle centred in `area`, clipped to it
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Widget that renders an image using half-block characters
struct ImageWidget<'a> {
    image: Option<&'a RgbImage>,
    /// Shown centred when there is no image
    placeholder: &'a str,
}

impl Widget for ImageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let Some(image) = self.image.filter(|img| img.width() > 0 && img.height() > 0) else {
            let msg = self.placeholder;
            let x = area.x + (area.width.saturating_sub(msg.chars().count() as u16)) / 2;
            let y = area.y + area.height / 2;
            buf.set_string(x, y, msg, Style::default());
            return;
        };

        // Calculate display dimensions maintaining aspect ratio
        // Each terminal cell displays 2 vertical pixels using half-block characters
        let image_aspect = image.width() as f64 / image.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height as f64) * 2.0;

        let (display_width, display_height) = if term_width / term_height > image_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * image_aspect;
            ((w as u16).max(1), ((h / 2.0) as u16).max(1))
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / image_aspect;
            ((w as u16).max(1), ((h / 2.0) as u16).max(1))
        };

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = image.width() as f64 / display_width as f64;
        let y_scale = image.height() as f64 / (display_height as f64 * 2.0);

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.right() || term_y >= area.bottom() {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(image, src_x, src_y_top));
                    cell.set_bg(sample_pixel(image, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(image: &RgbImage, x: u32, y: u32) -> Color {
    let x = x.min(image.width() - 1);
    let y = y.min(image.height() - 1);
    let [r, g, b] = image.get_pixel(x, y).0;
    Color::Rgb(r, g, b)
}

/// Row and column offsets of the grid overlay lines within `area`
///
/// Horizontal lines split the height into quarters; vertical lines sit at
/// fifths of the width.
fn grid_lines(area: Rect) -> (Vec<u16>, Vec<u16>) {
    let rows = (1..=GRID_LINES)
        .map(|i| area.y + i * area.height / GRID_ROW_DIVISOR)
        .collect();
    let columns = (1..=GRID_LINES)
        .map(|i| area.x + i * area.width / GRID_COLUMN_DIVISOR)
        .collect();
    (rows, columns)
}

/// White guide lines over the preview
struct GridOverlay;

impl Widget for GridOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::White);
        let (rows, columns) = grid_lines(area);
        for y in &rows {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, *y)) {
                    cell.set_char('─').set_style(style);
                }
            }
        }
        for x in &columns {
            for y in area.top()..area.bottom() {
                if let Some(cell) = buf.cell_mut((*x, y)) {
                    let symbol = if rows.contains(&y) { '┼' } else { '│' };
                    cell.set_char(symbol).set_style(style);
                }
            }
        }
    }
}

/// Simple status bar widget
struct StatusBar<'a> {
    state: &'a AppState,
    now: DateTime<Local>,
    /// Time spent on the pending capture; long exposures take seconds
    capture_elapsed: Option<Duration>,
}

impl StatusBar<'_> {
    fn left_text(&self) -> String {
        let settings = &self.state.settings;
        let status = match self.capture_elapsed {
            Some(elapsed) => format!("Capturing... {}s", elapsed.as_secs()),
            None if self.state.camera_ready => "Ready".to_string(),
            None => "No camera".to_string(),
        };
        format!(
            " ISO {} | {} | {} | {}",
            settings.iso, settings.shutter, self.state.config.capture_format, status
        )
    }

    fn right_text(&self) -> String {
        format!("{} {} ", self.now.format("%H:%M"), self.now.format("%d.%m.%Y"))
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let style = Style::default().bg(Color::DarkGray).fg(Color::White);

        // Fill background
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ').set_style(style);
            }
        }

        buf.set_string(area.x, area.y, self.left_text(), style);
        let right = self.right_text();
        let x = area.right().saturating_sub(right.chars().count() as u16);
        buf.set_string(x.max(area.x), area.y, right, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::gallery::GalleryPage;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with(panel: Panel) -> AppState {
        let mut state = AppState::new(Config::default());
        state.panel = panel;
        state
    }

    #[test]
    fn test_main_view_keys() {
        let state = state_with(Panel::None);
        assert!(matches!(key_to_message(&state, key(KeyCode::Char(' '))), Some(Message::Capture)));
        assert!(matches!(key_to_message(&state, key(KeyCode::Char('p'))), Some(Message::Capture)));
        assert!(matches!(key_to_message(&state, key(KeyCode::Char('g'))), Some(Message::OpenGallery)));
        assert!(matches!(key_to_message(&state, key(KeyCode::Esc)), Some(Message::Quit)));
        assert!(key_to_message(&state, key(KeyCode::Char('x'))).is_none());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(key_to_message(&state, ctrl_c), Some(Message::Quit)));
    }

    #[test]
    fn test_iso_menu_enter_selects_highlighted() {
        let state = state_with(Panel::IsoMenu { selected: 5 });
        assert!(matches!(key_to_message(&state, key(KeyCode::Enter)), Some(Message::SelectIso(800))));
        assert!(matches!(key_to_message(&state, key(KeyCode::Up)), Some(Message::MoveSelection(-1))));
        assert!(matches!(key_to_message(&state, key(KeyCode::Esc)), Some(Message::ClosePanel)));
    }

    #[test]
    fn test_custom_shutter_keys_type_number() {
        let state = state_with(Panel::CustomShutter {
            input: String::new(),
        });
        assert!(matches!(
            key_to_message(&state, key(KeyCode::Char('7'))),
            Some(Message::CustomShutterInput('7'))
        ));
        assert!(matches!(
            key_to_message(&state, key(KeyCode::Char('.'))),
            Some(Message::CustomShutterInput('.'))
        ));
        assert!(key_to_message(&state, key(KeyCode::Char('q'))).is_none());
        assert!(key_to_message(&state, key(KeyCode::Char('-'))).is_none());
        assert!(matches!(
            key_to_message(&state, key(KeyCode::Enter)),
            Some(Message::ApplyCustomShutter)
        ));
    }

    #[test]
    fn test_settings_arrows_step_sliders() {
        let state = state_with(Panel::Settings { selected: 0 });
        assert!(matches!(
            key_to_message(&state, key(KeyCode::Right)),
            Some(Message::SetSaturation(110))
        ));

        let state = state_with(Panel::Settings { selected: 4 });
        assert!(matches!(
            key_to_message(&state, key(KeyCode::Left)),
            Some(Message::SetAwbMode(AwbMode::Cloudy))
        ));
    }

    #[test]
    fn test_gallery_keys() {
        let state = state_with(Panel::Gallery {
            state: GalleryState::opened(),
            page: GalleryPage {
                page_index: 0,
                entries: Vec::new(),
                total: 0,
            },
        });
        assert!(matches!(key_to_message(&state, key(KeyCode::Char('n'))), Some(Message::GalleryNext)));
        assert!(matches!(key_to_message(&state, key(KeyCode::Left)), Some(Message::GalleryPrevious)));
        assert!(matches!(
            key_to_message(&state, key(KeyCode::Char('3'))),
            Some(Message::GalleryOpen(2))
        ));
        assert!(matches!(key_to_message(&state, key(KeyCode::Backspace)), Some(Message::GalleryBack)));
    }

    #[test]
    fn test_options_folder_editing() {
        let state = state_with(Panel::Options {
            selected: 0,
            folder_input: Some(" /media/usb ".to_string()),
        });
        match key_to_message(&state, key(KeyCode::Enter)) {
            Some(Message::SetImageFolder(path)) => assert_eq!(path, PathBuf::from("/media/usb")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_status_bar_counts_capture_seconds() {
        let mut state = AppState::new(Config::default());
        state.camera_ready = true;
        let now = Local::now();

        let idle = StatusBar {
            state: &state,
            now,
            capture_elapsed: None,
        };
        assert!(idle.left_text().ends_with("| Ready"));

        let busy = StatusBar {
            state: &state,
            now,
            capture_elapsed: Some(Duration::from_millis(3400)),
        };
        assert!(busy.left_text().ends_with("| Capturing... 3s"));
    }

    #[test]
    fn test_grid_lines_quarters_and_fifths() {
        let (rows, columns) = grid_lines(Rect::new(0, 0, 100, 40));
        assert_eq!(rows, vec![10, 20, 30]);
        assert_eq!(columns, vec![20, 40, 60]);
    }

    #[test]
    fn test_slider_bar() {
        assert_eq!(slider_bar(ColorSlider::Saturation, 1.0, 10), "[#####-----]");
        assert_eq!(slider_bar(ColorSlider::Brightness, -1.0, 4), "[----]");
        assert_eq!(slider_bar(ColorSlider::Contrast, 9.0, 4), "[####]");
    }

    #[test]
    fn test_image_widget_half_blocks() {
        let mut image = RgbImage::new(2, 2);
        for x in 0..2 {
            image.put_pixel(x, 0, image::Rgb([255, 0, 0]));
            image.put_pixel(x, 1, image::Rgb([0, 0, 255]));
        }
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        ImageWidget {
            image: Some(&image),
            placeholder: "",
        }
        .render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }
}
