use harling::Rgba;

/// Colour of pixel `(x, y)` for a given shift.
///
/// The base gradient is `(y, x, 255 - y)`; red rotates forward by the shift,
/// green backward by three times it and blue forward by twice it. Every
/// channel wraps at 8 bits, coordinates included.
pub fn shift_color(x: usize, y: usize, shift: i32) -> Rgba {
    let (x, y, shift) = (x as u8, y as u8, shift as u8);
    let (r, g, b) = (y, x, u8::MAX - y);
    Rgba::rgb(
        r.wrapping_add(shift),
        g.wrapping_sub(shift.wrapping_mul(3)),
        b.wrapping_add(shift.wrapping_mul(2)),
    )
}

/// A counter that climbs from 0 past 255 and back down again, one step per
/// frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shift {
    value: i32,
    falling: bool,
}

impl Shift {
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn advance(&mut self) {
        if self.falling {
            self.value -= 1;
        } else {
            self.value += 1;
        }

        if self.value > 255 {
            self.falling = true;
        } else if self.value < 1 {
            self.falling = false;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Fill the frame buffer row by row.
    #[default]
    Buffer,
    /// Plot one point at a time.
    Points,
}

pub fn render_square(
    frame_buffer: &mut [Rgba],
    width: usize,
    height: usize,
    shift: i32,
    mode: RenderMode,
) {
    debug_assert_eq!(frame_buffer.len(), width * height);
    match mode {
        RenderMode::Buffer => {
            for (y, row) in frame_buffer.chunks_exact_mut(width).enumerate() {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = shift_color(x, y, shift);
                }
            }
        }
        RenderMode::Points => plot_square(width, height, shift, |x, y, color| {
            frame_buffer[y * width + x] = color;
        }),
    }
}

pub fn plot_square(
    width: usize,
    height: usize,
    shift: i32,
    mut plot: impl FnMut(usize, usize, Rgba),
) {
    for y in 0..height {
        for x in 0..width {
            plot(x, y, shift_color(x, y, shift));
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn unshifted_gradient() {
        assert_eq!(shift_color(0, 0, 0), Rgba::rgb(0, 0, 255));
        assert_eq!(shift_color(10, 20, 0), Rgba::rgb(20, 10, 235));
        assert_eq!(shift_color(255, 255, 0), Rgba::rgb(255, 255, 0));
    }

    #[test]
    fn channels_rotate_at_different_rates() {
        // r = 20 + 1, g = 10 - 3, b = 235 + 2
        assert_eq!(shift_color(10, 20, 1), Rgba::rgb(21, 7, 237));
        // g = 0 - 300 wraps to 212, b = 255 + 200 wraps to 199
        assert_eq!(shift_color(0, 0, 100), Rgba::rgb(100, 212, 199));
    }

    #[test]
    fn peak_shift_of_256_is_identity() {
        for (x, y) in [(0, 0), (17, 200), (255, 3)] {
            assert_eq!(shift_color(x, y, 256), shift_color(x, y, 0));
        }
    }

    #[test]
    fn shift_ping_pongs_through_256() {
        let mut shift = Shift::default();
        let mut seen = Vec::new();
        for _ in 0..514 {
            seen.push(shift.value());
            shift.advance();
        }

        assert_eq!(seen[0], 0);
        assert_eq!(seen[255], 255);
        assert_eq!(seen[256], 256);
        assert_eq!(seen[257], 255);
        assert_eq!(seen[512], 0);
        assert_eq!(seen[513], 1);
        assert_eq!(seen.iter().max(), Some(&256));
        assert_eq!(seen.iter().min(), Some(&0));
    }

    #[test]
    fn shift_turns_at_the_ends() {
        let mut shift = Shift::default();
        for _ in 0..256 {
            shift.advance();
        }
        assert_eq!(shift.value(), 256);
        assert!(shift.is_falling());

        for _ in 0..256 {
            shift.advance();
        }
        assert_eq!(shift.value(), 0);
        assert!(!shift.is_falling());
    }

    #[test]
    fn render_modes_agree() {
        let (width, height) = (7, 5);
        let mut buffer = vec![Rgba::BLACK; width * height];
        let mut points = vec![Rgba::BLACK; width * height];
        render_square(&mut buffer, width, height, 42, RenderMode::Buffer);
        render_square(&mut points, width, height, 42, RenderMode::Points);
        assert_eq!(buffer, points);
        assert_eq!(buffer[2 * width + 3], shift_color(3, 2, 42));
    }

    #[test]
    fn plot_visits_every_pixel_once() {
        let mut visits = vec![0u8; 6 * 4];
        plot_square(6, 4, 0, |x, y, _| visits[y * 6 + x] += 1);
        assert!(visits.iter().all(|&v| v == 1));
    }

    proptest! {
        #[test]
        fn alpha_is_always_opaque(x in 0usize..4096, y in 0usize..4096, shift in 0i32..=256) {
            prop_assert_eq!(shift_color(x, y, shift).a, 255);
        }

        #[test]
        fn coordinates_wrap_every_256(x in 0usize..256, y in 0usize..256, shift in 0i32..=256) {
            prop_assert_eq!(shift_color(x + 256, y + 512, shift), shift_color(x, y, shift));
        }

        #[test]
        fn matches_integer_formula(x in 0usize..1024, y in 0usize..1024, shift in 0i32..=256) {
            let (xi, yi) = (x as i32, y as i32);
            let expected = Rgba::rgb(
                (yi + shift) as u8,
                (xi - shift * 3) as u8,
                (255 - yi + shift * 2) as u8,
            );
            prop_assert_eq!(shift_color(x, y, shift), expected);
        }
    }
}
