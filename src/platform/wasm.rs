use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData, KeyboardEvent, Window,
};

use crate::platform::{PlatformRequest, PlatformState, fit_to_viewport};
use crate::{Control, Input, KeyCode, PlatformError, Rgba, WindowConfig};

struct Shared {
    request: Box<dyn FnMut(PlatformRequest<'_>) -> Control>,
    frame_buffer: Vec<Rgba>,
    width: usize,
    height: usize,
    last_time: f64,
    quit: bool,
}

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!(
            "[{} {}] {}",
            record.level(),
            record.target(),
            record.args()
        ));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug => web_sys::console::debug_1(&line),
            log::Level::Trace => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

pub fn init_logger(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn js_error(value: JsValue) -> PlatformError {
    PlatformError::Canvas(format!("{value:?}"))
}

fn browser_window() -> Result<Window, PlatformError> {
    web_sys::window().ok_or_else(|| PlatformError::Canvas(String::from("no global `window`")))
}

fn init_canvas(
    document: &Document,
    config: &WindowConfig,
) -> Result<HtmlCanvasElement, PlatformError> {
    let canvas = document
        .create_element("canvas")
        .map_err(js_error)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| PlatformError::Canvas(String::from("element is not a canvas")))?;
    canvas.set_width(config.width as u32);
    canvas.set_height(config.height as u32);
    canvas.set_title(&config.title);
    document
        .body()
        .ok_or_else(|| PlatformError::Canvas(String::from("document has no body")))?
        .append_child(&canvas)
        .map_err(js_error)?;
    Ok(canvas)
}

fn viewport(window: &Window) -> Option<(f64, f64)> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width, height))
}

fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> Result<(), PlatformError> {
    let Some((viewport_width, viewport_height)) = viewport(window) else {
        return Ok(());
    };
    let (width, height) = fit_to_viewport(
        canvas.width() as usize,
        canvas.height() as usize,
        viewport_width,
        viewport_height,
    );
    let style = canvas.style();
    style
        .set_property("width", &format!("{width}px"))
        .map_err(js_error)?;
    style
        .set_property("height", &format!("{height}px"))
        .map_err(js_error)?;
    style
        .set_property("image-rendering", "pixelated")
        .map_err(js_error)?;
    Ok(())
}

/// Hands `input` to the application unless it has already quit.
fn send_input(shared: &RefCell<Shared>, input: Input) -> Option<Control> {
    let mut shared = shared.borrow_mut();
    if shared.quit {
        return None;
    }
    let control = (shared.request)(PlatformRequest::Input(input));
    shared.quit = control == Control::Quit;
    Some(control)
}

fn dispatch(
    shared: &RefCell<Shared>,
    document: &Document,
    canvas: &HtmlCanvasElement,
    input: Input,
) {
    let Some(control) = send_input(shared, input) else {
        return;
    };

    match control {
        Control::Continue => {}
        Control::Quit => log::info!("quit requested, stopping animation"),
        Control::Fullscreen(true) => {
            log::debug!("requesting fullscreen");
            if let Err(err) = canvas.request_fullscreen() {
                log::error!("{}", js_error(err));
            }
        }
        Control::Fullscreen(false) => {
            log::debug!("leaving fullscreen");
            document.exit_fullscreen();
        }
    }
}

fn listen_keys(
    shared: &Rc<RefCell<Shared>>,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), PlatformError> {
    for (kind, pressed) in [("keydown", true), ("keyup", false)] {
        let shared = shared.clone();
        let target = document.clone();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let input = Input::Key {
                code: KeyCode::from_dom_code(&event.code()),
                pressed,
                repeat: event.repeat(),
            };
            dispatch(&shared, &target, &canvas, input);
        });
        document
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        closure.forget();
    }
    Ok(())
}

fn listen_resize(
    shared: &Rc<RefCell<Shared>>,
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), PlatformError> {
    let shared = shared.clone();
    let target = window.clone();
    let document = document.clone();
    let canvas = canvas.clone();
    let closure = Closure::<dyn FnMut()>::new(move || {
        if let Err(err) = fit_canvas(&target, &canvas) {
            log::error!("{err}");
        }
        if let Some((width, height)) = viewport(&target) {
            let input = Input::Resized {
                width: width as usize,
                height: height as usize,
            };
            dispatch(&shared, &document, &canvas, input);
        }
    });
    window
        .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
        .map_err(js_error)?;
    closure.forget();
    Ok(())
}

fn listen_fullscreen(
    shared: &Rc<RefCell<Shared>>,
    document: &Document,
    canvas: &HtmlCanvasElement,
) -> Result<(), PlatformError> {
    let shared = shared.clone();
    let target = document.clone();
    let canvas = canvas.clone();
    let closure = Closure::<dyn FnMut()>::new(move || {
        let fullscreen = target.fullscreen_element().is_some();
        dispatch(&shared, &target, &canvas, Input::FullscreenChanged(fullscreen));
    });
    document
        .add_event_listener_with_callback("fullscreenchange", closure.as_ref().unchecked_ref())
        .map_err(js_error)?;
    closure.forget();
    Ok(())
}

fn frame(
    shared: &RefCell<Shared>,
    context: &CanvasRenderingContext2d,
    now: f64,
) -> Result<(), PlatformError> {
    let mut shared = shared.borrow_mut();
    let Shared {
        request,
        frame_buffer,
        width,
        height,
        last_time,
        ..
    } = &mut *shared;

    let delta = ((now - *last_time) / 1000.0).max(0.0) as f32;
    *last_time = now;
    request(PlatformRequest::Update(PlatformState {
        delta,
        frame_buffer: frame_buffer.as_mut_slice(),
        width: *width,
        height: *height,
    }));

    let image_data = ImageData::new_with_u8_clamped_array_and_sh(
        wasm_bindgen::Clamped(crate::as_bytes(frame_buffer)),
        *width as u32,
        *height as u32,
    )
    .map_err(js_error)?;
    context
        .put_image_data(&image_data, 0.0, 0.0)
        .map_err(js_error)
}

fn game_loop(shared: Rc<RefCell<Shared>>, context: CanvasRenderingContext2d) {
    let closure = Closure::once_into_js(move |now: f64| {
        if shared.borrow().quit {
            return;
        }
        if let Err(err) = frame(&shared, &context, now) {
            log::error!("{err}");
            return;
        }
        game_loop(shared, context);
    });

    let requested = browser_window().and_then(|window| {
        window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(js_error)
    });
    if let Err(err) = requested {
        log::error!("{err}");
    }
}

/// Runs on `requestAnimationFrame`, so the browser picks the frame rate and
/// `frame_interval` is not used.
pub fn run(
    request: impl FnMut(PlatformRequest<'_>) -> Control + 'static,
    config: &WindowConfig,
) -> Result<(), PlatformError> {
    let window = browser_window()?;
    let document = window
        .document()
        .ok_or_else(|| PlatformError::Canvas(String::from("no document")))?;

    let canvas = init_canvas(&document, config)?;
    let context = canvas
        .get_context("2d")
        .map_err(js_error)?
        .ok_or_else(|| PlatformError::Canvas(String::from("2d context unavailable")))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| PlatformError::Canvas(String::from("not a 2d context")))?;
    fit_canvas(&window, &canvas)?;

    let last_time = window.performance().map_or(0.0, |performance| performance.now());
    let shared = Rc::new(RefCell::new(Shared {
        request: Box::new(request),
        frame_buffer: vec![Rgba::BLACK; config.pixels()],
        width: config.width,
        height: config.height,
        last_time,
        quit: false,
    }));
    listen_keys(&shared, &document, &canvas)?;
    listen_resize(&shared, &window, &document, &canvas)?;
    listen_fullscreen(&shared, &document, &canvas)?;

    log::info!("canvas ready at {}x{}", config.width, config.height);
    game_loop(shared, context);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> RefCell<Shared> {
        RefCell::new(Shared {
            request: Box::new(|request: PlatformRequest<'_>| match request {
                PlatformRequest::Input(Input::Key {
                    code: KeyCode::KeyQ,
                    ..
                }) => Control::Quit,
                PlatformRequest::Input(_) => Control::Fullscreen(true),
                PlatformRequest::Update(_) => Control::Continue,
            }),
            frame_buffer: vec![Rgba::BLACK; 1],
            width: 1,
            height: 1,
            last_time: 0.0,
            quit: false,
        })
    }

    #[test]
    fn keys_are_ignored_once_quit() {
        let shared = shared();
        let f = Input::key_down(KeyCode::KeyF);
        assert_eq!(send_input(&shared, f), Some(Control::Fullscreen(true)));
        assert_eq!(
            send_input(&shared, Input::key_down(KeyCode::KeyQ)),
            Some(Control::Quit)
        );
        assert!(shared.borrow().quit);
        assert_eq!(send_input(&shared, f), None);
    }
}
