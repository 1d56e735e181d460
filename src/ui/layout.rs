use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub header: Rect,
    pub body: Rect,
    pub output: Rect,
    pub command: Rect,
    pub prompt: Rect,
}

pub fn split_layout(area: Rect, header_height: u16, body_height: u16) -> UiLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Length(body_height),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(area);

    UiLayout {
        header: chunks[0],
        body: chunks[1],
        output: chunks[2],
        command: chunks[3],
        prompt: chunks[4],
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::split_layout;

    #[test]
    fn regions_partition_the_frame_top_to_bottom() {
        let layout = split_layout(Rect::new(0, 0, 80, 24), 3, 6);

        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.body.height, 6);
        assert_eq!(layout.command.height, 1);
        assert_eq!(layout.prompt.height, 2);
        assert_eq!(
            layout.header.height
                + layout.body.height
                + layout.output.height
                + layout.command.height
                + layout.prompt.height,
            24
        );
        assert!(layout.output.y > layout.body.y);
        assert!(layout.prompt.y > layout.command.y);
    }

    #[test]
    fn a_headerless_page_gives_the_header_no_rows() {
        let layout = split_layout(Rect::new(0, 0, 80, 24), 0, 4);

        assert_eq!(layout.header.height, 0);
        assert_eq!(layout.body.y, 0);
    }
}
