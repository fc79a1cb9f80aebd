use std::cell::{Cell, RefCell};
use std::time::Instant;

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{AnyThread, DefinedClass, MainThreadOnly, define_class, msg_send};
use objc2_app_kit::{
    NSApplication, NSApplicationActivationPolicy, NSApplicationDelegate,
    NSApplicationTerminateReply, NSBackingStoreType, NSBitmapImageRep, NSColorSpaceName, NSEvent,
    NSImage, NSView, NSWindow, NSWindowCollectionBehavior, NSWindowDelegate, NSWindowStyleMask,
};
use objc2_foundation::{
    MainThreadMarker, NSNotification, NSObject, NSObjectProtocol, NSPoint, NSRect, NSSize,
    NSString, NSTimer,
};

use crate::pacing::FpsCounter;
use crate::platform::{PlatformRequest, PlatformState};
use crate::{Control, Input, KeyCode, PlatformError, Rgba, WindowConfig};

type Request = Box<dyn FnMut(PlatformRequest<'_>) -> Control>;

pub fn run(
    request: impl FnMut(PlatformRequest<'_>) -> Control + 'static,
    config: &WindowConfig,
) -> Result<(), PlatformError> {
    let mtm = MainThreadMarker::new()
        .ok_or_else(|| PlatformError::Window(String::from("AppKit must run on the main thread")))?;
    let app = NSApplication::sharedApplication(mtm);

    let content = NSSize::new(
        (config.width * config.scale) as f64,
        (config.height * config.scale) as f64,
    );
    let mut style = NSWindowStyleMask::Titled
        | NSWindowStyleMask::Closable
        | NSWindowStyleMask::Miniaturizable;
    if config.resizable {
        style |= NSWindowStyleMask::Resizable;
    }
    let window = unsafe {
        NSWindow::initWithContentRect_styleMask_backing_defer(
            NSWindow::alloc(mtm),
            NSRect::new(NSPoint::new(0.0, 0.0), content),
            style,
            NSBackingStoreType::Buffered,
            false,
        )
    };
    unsafe { window.setReleasedWhenClosed(false) };

    window.setTitle(&NSString::from_str(&config.title));
    unsafe { window.setCollectionBehavior(NSWindowCollectionBehavior::FullScreenPrimary) };
    window.center();
    window.makeKeyAndOrderFront(None);

    let view = GameView::new(mtm, window.clone(), Box::new(request), config);
    window.setContentView(Some(&*view.clone().into_super()));
    window.makeFirstResponder(Some(&view));
    let delegate = Delegate::new(mtm, window.clone(), view, config);
    window.setDelegate(Some(ProtocolObject::from_ref(&*delegate)));
    app.setDelegate(Some(ProtocolObject::from_ref(&*delegate)));
    app.setActivationPolicy(NSApplicationActivationPolicy::Regular);
    // Required when launching unbundled (as is done with Cargo).
    #[expect(deprecated)]
    app.activateIgnoringOtherApps(true);

    log::info!("opened {}x{} window \"{}\"", content.width, content.height, config.title);
    app.run();
    Ok(())
}

struct AppDelegateIvars {
    #[expect(unused)]
    window: Retained<NSWindow>,
    view: Retained<GameView>,
    _timer: Retained<NSTimer>,
}

define_class!(
    #[unsafe(super = NSObject)]
    #[thread_kind = MainThreadOnly]
    #[ivars = AppDelegateIvars]
    struct Delegate;

    unsafe impl NSObjectProtocol for Delegate {}

    unsafe impl NSApplicationDelegate for Delegate {
        #[unsafe(method(applicationShouldTerminate:))]
        unsafe fn application_should_terminate(
            &self,
            _sender: &NSApplication,
        ) -> NSApplicationTerminateReply {
            log::info!("application terminating");
            NSApplicationTerminateReply::TerminateNow
        }

        #[unsafe(method(applicationShouldTerminateAfterLastWindowClosed:))]
        unsafe fn application_should_terminate_after_last_window_closed(
            &self,
            _sender: &NSApplication,
        ) -> bool {
            true
        }
    }

    unsafe impl NSWindowDelegate for Delegate {
        #[unsafe(method(windowWillClose:))]
        fn window_will_close(&self, _notification: &NSNotification) {
            self.ivars().view.dispatch(Input::CloseRequested);
            unsafe { NSApplication::sharedApplication(self.mtm()).terminate(None) };
        }

        #[unsafe(method(windowDidResize:))]
        fn window_did_resize(&self, _notification: &NSNotification) {
            let size = self.ivars().view.bounds().size;
            self.ivars().view.dispatch(Input::Resized {
                width: size.width as usize,
                height: size.height as usize,
            });
        }

        #[unsafe(method(windowDidEnterFullScreen:))]
        fn window_did_enter_full_screen(&self, _notification: &NSNotification) {
            self.ivars().view.fullscreen_changed(true);
        }

        #[unsafe(method(windowDidExitFullScreen:))]
        fn window_did_exit_full_screen(&self, _notification: &NSNotification) {
            self.ivars().view.fullscreen_changed(false);
        }
    }
);

impl Delegate {
    fn new(
        mtm: MainThreadMarker,
        window: Retained<NSWindow>,
        view: Retained<GameView>,
        config: &WindowConfig,
    ) -> Retained<Self> {
        let _timer = unsafe {
            NSTimer::scheduledTimerWithTimeInterval_target_selector_userInfo_repeats(
                config.frame_interval.as_secs_f64(),
                &view,
                objc2::sel!(update:),
                None,
                true,
            )
        };
        let this = Self::alloc(mtm).set_ivars(AppDelegateIvars {
            window,
            view,
            _timer,
        });
        unsafe { msg_send![super(this), init] }
    }
}

struct GameViewIvars {
    frame_buffer: RefCell<Vec<Rgba>>,
    width: usize,
    height: usize,
    request: RefCell<Request>,
    last_time: Cell<Instant>,
    fps: RefCell<FpsCounter>,
    fullscreen: Cell<bool>,
    title: String,
    window: Retained<NSWindow>,
}

define_class!(
    #[unsafe(super = NSView)]
    #[thread_kind = MainThreadOnly]
    #[ivars = GameViewIvars]
    struct GameView;

    unsafe impl NSObjectProtocol for GameView {}

    impl GameView {
        #[unsafe(method(drawRect:))]
        fn draw_rect(&self, _rect: NSRect) {
            let ivars = self.ivars();
            let Ok(frame_buffer) = ivars.frame_buffer.try_borrow() else {
                return;
            };
            let (width, height) = (ivars.width as isize, ivars.height as isize);

            let image_rep = unsafe {
                let planes: [*const u8; 1] = [crate::as_bytes(&frame_buffer).as_ptr()];
                NSBitmapImageRep::initWithBitmapDataPlanes_pixelsWide_pixelsHigh_bitsPerSample_samplesPerPixel_hasAlpha_isPlanar_colorSpaceName_bytesPerRow_bitsPerPixel(
                    NSBitmapImageRep::alloc(),
                    planes.as_ptr() as *mut _,
                    width,
                    height,
                    8,
                    4,
                    true,
                    false,
                    &*NSColorSpaceName::from_str("NSCalibratedRGBColorSpace"),
                    width * 4,
                    32,
                )
            };

            if let Some(image_rep) = image_rep {
                unsafe {
                    let size = NSSize::new(width as f64, height as f64);
                    let image = NSImage::initWithSize(NSImage::alloc(), size);
                    image.addRepresentation(&image_rep);
                    image.drawInRect(self.bounds());
                }
            }
        }

        #[unsafe(method(update:))]
        fn update(&self, _timer: &NSTimer) {
            let ivars = self.ivars();

            let now = Instant::now();
            let delta = now.duration_since(ivars.last_time.replace(now)).as_secs_f32();
            if let Some(fps) = ivars.fps.borrow_mut().tick(delta) {
                let title = format!("{} - {:.2}", ivars.title, fps);
                ivars.window.setTitle(&NSString::from_str(&title));
            }

            {
                let (Ok(mut frame_buffer), Ok(mut request)) = (
                    ivars.frame_buffer.try_borrow_mut(),
                    ivars.request.try_borrow_mut(),
                ) else {
                    return;
                };
                request(PlatformRequest::Update(PlatformState {
                    delta,
                    frame_buffer: &mut frame_buffer,
                    width: ivars.width,
                    height: ivars.height,
                }));
            }
            unsafe { self.setNeedsDisplay(true) };
        }

        #[unsafe(method(acceptsFirstResponder))]
        fn accepts_first_responder(&self) -> bool {
            true
        }

        #[unsafe(method(keyDown:))]
        fn key_down(&self, event: &NSEvent) {
            self.dispatch(Input::Key {
                code: key_code(unsafe { event.keyCode() }),
                pressed: true,
                repeat: unsafe { event.isARepeat() },
            });
        }

        #[unsafe(method(keyUp:))]
        fn key_up(&self, event: &NSEvent) {
            self.dispatch(Input::Key {
                code: key_code(unsafe { event.keyCode() }),
                pressed: false,
                repeat: unsafe { event.isARepeat() },
            });
        }
    }
);

impl GameView {
    fn new(
        mtm: MainThreadMarker,
        window: Retained<NSWindow>,
        request: Request,
        config: &WindowConfig,
    ) -> Retained<Self> {
        let ivars = GameViewIvars {
            frame_buffer: RefCell::new(vec![Rgba::BLACK; config.pixels()]),
            width: config.width,
            height: config.height,
            request: RefCell::new(request),
            last_time: Cell::new(Instant::now()),
            fps: RefCell::new(FpsCounter::default()),
            fullscreen: Cell::new(false),
            title: config.title.clone(),
            window,
        };
        let this = Self::alloc(mtm).set_ivars(ivars);
        unsafe { msg_send![super(this), init] }
    }

    fn dispatch(&self, input: Input) {
        let ivars = self.ivars();
        let control = match ivars.request.try_borrow_mut() {
            Ok(mut request) => request(PlatformRequest::Input(input)),
            Err(_) => return,
        };

        match control {
            Control::Continue => {}
            Control::Quit => {
                log::info!("quit requested");
                unsafe { NSApplication::sharedApplication(self.mtm()).terminate(None) };
            }
            Control::Fullscreen(fullscreen) => {
                if ivars.fullscreen.get() != fullscreen {
                    log::debug!("switching fullscreen to {fullscreen}");
                    unsafe { ivars.window.toggleFullScreen(None) };
                }
            }
        }
    }

    /// Records a finished transition, including ones started by the title
    /// bar button or the system shortcut, and tells the application.
    fn fullscreen_changed(&self, fullscreen: bool) {
        log::debug!("window fullscreen is now {fullscreen}");
        self.ivars().fullscreen.set(fullscreen);
        self.dispatch(Input::FullscreenChanged(fullscreen));
    }
}

// https://gist.github.com/eegrok/949034
fn key_code(code: u16) -> KeyCode {
    KEY_CODE_LUT
        .get(code as usize)
        .copied()
        .unwrap_or(KeyCode::Unknown)
}

const KEY_CODE_LUT: [KeyCode; 128] = {
    let mut lut = [KeyCode::Unknown; 128];
    lut[0x00] = KeyCode::KeyA;
    lut[0x01] = KeyCode::KeyS;
    lut[0x02] = KeyCode::KeyD;
    lut[0x03] = KeyCode::KeyF;
    lut[0x04] = KeyCode::KeyH;
    lut[0x05] = KeyCode::KeyG;
    lut[0x06] = KeyCode::KeyZ;
    lut[0x07] = KeyCode::KeyX;
    lut[0x08] = KeyCode::KeyC;
    lut[0x09] = KeyCode::KeyV;
    lut[0x0B] = KeyCode::KeyB;
    lut[0x0C] = KeyCode::KeyQ;
    lut[0x0D] = KeyCode::KeyW;
    lut[0x0E] = KeyCode::KeyE;
    lut[0x0F] = KeyCode::KeyR;
    lut[0x10] = KeyCode::KeyY;
    lut[0x11] = KeyCode::KeyT;
    lut[0x12] = KeyCode::Num1;
    lut[0x13] = KeyCode::Num2;
    lut[0x14] = KeyCode::Num3;
    lut[0x15] = KeyCode::Num4;
    lut[0x16] = KeyCode::Num6;
    lut[0x17] = KeyCode::Num5;
    lut[0x19] = KeyCode::Num9;
    lut[0x1A] = KeyCode::Num7;
    lut[0x1C] = KeyCode::Num8;
    lut[0x1D] = KeyCode::Num0;
    lut[0x1F] = KeyCode::KeyO;
    lut[0x20] = KeyCode::KeyU;
    lut[0x22] = KeyCode::KeyI;
    lut[0x23] = KeyCode::KeyP;
    lut[0x24] = KeyCode::Return;
    lut[0x25] = KeyCode::KeyL;
    lut[0x26] = KeyCode::KeyJ;
    lut[0x28] = KeyCode::KeyK;
    lut[0x2D] = KeyCode::KeyN;
    lut[0x2E] = KeyCode::KeyM;
    lut[0x30] = KeyCode::Tab;
    lut[0x31] = KeyCode::Spacebar;
    lut[0x35] = KeyCode::Escape;
    lut[0x7B] = KeyCode::LeftArrow;
    lut[0x7C] = KeyCode::RightArrow;
    lut[0x7D] = KeyCode::DownArrow;
    lut[0x7E] = KeyCode::UpArrow;
    lut
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_key_codes() {
        assert_eq!(key_code(0x35), KeyCode::Escape);
        assert_eq!(key_code(0x0C), KeyCode::KeyQ);
        assert_eq!(key_code(0x03), KeyCode::KeyF);
        assert_eq!(key_code(0x7F), KeyCode::Unknown);
        assert_eq!(key_code(0x200), KeyCode::Unknown);
    }
}
