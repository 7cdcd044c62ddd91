//! CPU framebuffer the software renderer draws into
//!
//! RGBA8, row-major, opaque. Blending is straight alpha over the existing
//! pixel.

/// An opaque color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub const fn from_array(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Multiply each channel, clamping to 255
    pub fn scaled(self, factor: f32) -> Self {
        let ch = |c: u8| (c as f32 * factor).clamp(0.0, 255.0).round() as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }

    #[inline]
    fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

#[inline]
fn mix(dst: u8, src: u8, alpha: f32) -> u8 {
    (dst as f32 + (src as f32 - dst as f32) * alpha).round() as u8
}

#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK.rgba(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels
            .resize(width as usize * height as usize, Rgb::BLACK.rgba());
    }

    /// Raw RGBA bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let [r, g, b, _] = self.pixels[(y * self.width + x) as usize];
        Some(Rgb::new(r, g, b))
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color.rgba());
    }

    /// Clip a rectangle to the buffer; None when nothing is left
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color.rgba());
        }
    }

    /// Blend `color` over a rectangle with `alpha` in [0, 1]
    pub fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            for px in &mut self.pixels[row * stride + x0..row * stride + x1] {
                px[0] = mix(px[0], color.r, alpha);
                px[1] = mix(px[1], color.g, alpha);
                px[2] = mix(px[2], color.b, alpha);
            }
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let px = &mut self.pixels[y as usize * self.width as usize + x as usize];
        px[0] = mix(px[0], color.r, alpha);
        px[1] = mix(px[1], color.g, alpha);
        px[2] = mix(px[2], color.b, alpha);
    }

    /// Fill one column between fractional rows
    pub fn fill_column(&mut self, x: i32, top: f32, height: f32, color: Rgb) {
        let y0 = top.round() as i32;
        let y1 = (top + height).round() as i32;
        self.fill_rect(x, y0, 1, y1 - y0, color);
    }

    pub fn blend_column(&mut self, x: i32, top: f32, height: f32, color: Rgb, alpha: f32) {
        let y0 = top.round() as i32;
        let y1 = (top + height).round() as i32;
        self.blend_rect(x, y0, 1, y1 - y0, color, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::hex(0x8d6944), Rgb::new(0x8d, 0x69, 0x44));
    }

    #[test]
    fn test_fill_is_clipped() {
        let mut fb = Framebuffer::new(4, 3);
        fb.fill_rect(-2, -2, 10, 10, Rgb::new(9, 9, 9));
        assert_eq!(fb.pixel(3, 2), Some(Rgb::new(9, 9, 9)));
        assert_eq!(fb.pixel(4, 0), None);
        // Fully outside is a no-op rather than a panic
        fb.fill_rect(10, 10, 2, 2, Rgb::BLACK);
        fb.fill_column(-1, 0.0, 3.0, Rgb::BLACK);
    }

    #[test]
    fn test_blend_half() {
        let mut fb = Framebuffer::new(1, 1);
        fb.clear(Rgb::new(0, 0, 0));
        fb.blend_rect(0, 0, 1, 1, Rgb::new(200, 100, 50), 0.5);
        assert_eq!(fb.pixel(0, 0), Some(Rgb::new(100, 50, 25)));
    }

    #[test]
    fn test_bytes_are_rgba() {
        let mut fb = Framebuffer::new(2, 1);
        fb.clear(Rgb::new(1, 2, 3));
        assert_eq!(fb.as_bytes(), &[1, 2, 3, 255, 1, 2, 3, 255]);
    }

    #[test]
    fn test_scaled_clamps() {
        assert_eq!(Rgb::new(200, 10, 0).scaled(2.0), Rgb::new(255, 20, 0));
    }
}
