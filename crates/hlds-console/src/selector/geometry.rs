//! Screen-space layout of the selector popup.

/// Axis-aligned rectangle in screen coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point lies inside. Right and bottom edges are exclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Vertical padding around the item list, split evenly top and bottom
const LIST_PADDING: i32 = 4;

/// Extra height per row on top of the text size
const ROW_PADDING: i32 = 6;

/// Where the popup sits and which rows it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    /// Popup rectangle in screen coordinates
    pub rect: Rect,
    /// Height of one row
    pub item_height: i32,
    /// Index of the topmost visible item
    pub first_visible: usize,
    /// Rows that fit inside the popup
    pub visible_rows: usize,
    /// Total number of items
    pub item_count: usize,
}

impl PopupGeometry {
    /// Lay out a popup over `anchor`.
    ///
    /// The popup keeps the anchor's width and is as tall as the list, capped
    /// at `max_height`. It is moved up when it would run past the bottom of
    /// `screen`, but never above its top. The initial scroll centres
    /// `selected` when the list does not fit.
    pub fn layout(
        anchor: Rect,
        screen: Rect,
        item_count: usize,
        text_size: i32,
        max_height: i32,
        selected: Option<usize>,
    ) -> Self {
        let item_height = (text_size + ROW_PADDING).max(1);
        let rows = i32::try_from(item_count).unwrap_or(i32::MAX);
        let full_height = rows.saturating_mul(item_height).saturating_add(LIST_PADDING);
        let height = full_height.min(max_height.max(item_height + LIST_PADDING));

        let mut y = anchor.y;
        if y + height > screen.bottom() {
            y = (screen.bottom() - height).max(screen.y);
        }

        let visible_rows = usize::try_from((height - LIST_PADDING) / item_height)
            .unwrap_or(1)
            .max(1);

        let mut geometry = Self {
            rect: Rect::new(anchor.x, y, anchor.width, height),
            item_height,
            first_visible: 0,
            visible_rows,
            item_count,
        };
        if let Some(index) = selected {
            geometry.first_visible = geometry.clamp_first(index.saturating_sub(visible_rows / 2));
        }
        geometry
    }

    /// Largest useful value of `first_visible`
    pub fn max_first_visible(&self) -> usize {
        self.item_count.saturating_sub(self.visible_rows)
    }

    /// Scroll by `rows` (negative is up). Returns whether anything moved.
    pub fn scroll_by(&mut self, rows: i32) -> bool {
        let target = if rows < 0 {
            self.first_visible
                .saturating_sub(usize::try_from(rows.unsigned_abs()).unwrap_or(usize::MAX))
        } else {
            self.first_visible
                .saturating_add(usize::try_from(rows).unwrap_or(usize::MAX))
        };
        let target = self.clamp_first(target);
        let moved = target != self.first_visible;
        self.first_visible = target;
        moved
    }

    /// The item under a screen point, if any
    pub fn item_at(&self, x: i32, y: i32) -> Option<usize> {
        if !self.rect.contains(x, y) {
            return None;
        }

        let within = y - self.rect.y - LIST_PADDING / 2;
        if within < 0 {
            return None;
        }

        let row = usize::try_from(within / self.item_height).ok()?;
        if row >= self.visible_rows {
            return None;
        }

        let index = self.first_visible + row;
        (index < self.item_count).then_some(index)
    }

    /// Vertical centre of a visible item's row, if the item is scrolled into view
    pub fn item_center_y(&self, index: usize) -> Option<i32> {
        if index < self.first_visible || index >= self.item_count {
            return None;
        }
        let row = index - self.first_visible;
        if row >= self.visible_rows {
            return None;
        }
        let row = i32::try_from(row).ok()?;
        Some(self.rect.y + LIST_PADDING / 2 + row * self.item_height + self.item_height / 2)
    }

    fn clamp_first(&self, first: usize) -> usize {
        first.min(self.max_first_visible())
    }
}
