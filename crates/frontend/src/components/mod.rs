pub mod individual_panel;
pub mod map_view;
pub mod marker_list;
pub mod timeline_control;
