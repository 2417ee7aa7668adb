pub mod chart;
pub mod daily;
pub mod html;
pub mod weekly;
