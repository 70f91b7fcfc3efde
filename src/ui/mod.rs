pub mod bubble_panel;
pub mod canvas_panel;
pub mod sidebar;
pub mod table_view;
