mod list;
mod reorder;
mod sensor;

pub use list::{
    DndList, DndListDropTarget, DndListEvent, DndListItem, DndListReorder, DndListRowState,
    DndListState, dnd_list,
};
pub use reorder::{drop_destination, reorder_to_index_for_drop_on_row, row_at_position};
pub use sensor::{DragActivation, DragSensor, SensorEvent};
