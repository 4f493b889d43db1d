//! Embedding stones into equipment sockets
//!
//! These are the only mutations an [`Equipment`] sees after generation. The
//! equipment records stone ids; the stones themselves stay in the owner's
//! inventory.

use crate::item::{Equipment, Stone, StoneId};
use crate::SocketError;

/// Embed a stone into the first empty socket, returning its index
pub fn embed_stone(equipment: &mut Equipment, stone: &Stone) -> Result<usize, SocketError> {
    check_fit(equipment, stone)?;
    let index = equipment
        .sockets
        .as_ref()
        .and_then(|sockets| sockets.first_empty())
        .ok_or_else(|| SocketError::Full(equipment.id.clone()))?;
    place(equipment, stone, index)?;
    Ok(index)
}

/// Embed a stone into a specific empty socket
pub fn embed_stone_at(equipment: &mut Equipment, stone: &Stone, index: usize) -> Result<(), SocketError> {
    check_fit(equipment, stone)?;
    place(equipment, stone, index)
}

/// Take the stone id out of a socket, leaving it empty
pub fn remove_stone(equipment: &mut Equipment, index: usize) -> Result<StoneId, SocketError> {
    let sockets = equipment
        .sockets
        .as_mut()
        .ok_or_else(|| SocketError::NoSockets(equipment.id.clone()))?;
    let capacity = sockets.capacity();
    let slot = sockets
        .slot_mut(index)
        .ok_or(SocketError::OutOfRange { index, capacity })?;
    slot.take().ok_or(SocketError::Empty(index))
}

fn check_fit(equipment: &Equipment, stone: &Stone) -> Result<(), SocketError> {
    let sockets = match equipment.sockets {
        Some(ref sockets) if sockets.capacity() > 0 => sockets,
        _ => return Err(SocketError::NoSockets(equipment.id.clone())),
    };
    if !stone.fits(equipment.slot) {
        return Err(SocketError::IncompatibleSlot {
            stone: stone.id.clone(),
            slot: equipment.slot,
        });
    }
    if sockets.contains(&stone.id) {
        return Err(SocketError::AlreadyEmbedded(stone.id.clone()));
    }
    Ok(())
}

fn place(equipment: &mut Equipment, stone: &Stone, index: usize) -> Result<(), SocketError> {
    let sockets = equipment
        .sockets
        .as_mut()
        .ok_or_else(|| SocketError::NoSockets(equipment.id.clone()))?;
    let capacity = sockets.capacity();
    let slot = sockets
        .slot_mut(index)
        .ok_or(SocketError::OutOfRange { index, capacity })?;
    if slot.is_some() {
        return Err(SocketError::Occupied(index));
    }
    *slot = Some(stone.id.clone());
    tracing::debug!(stone = %stone.id, equipment = %equipment.id, index, "stone embedded");
    Ok(())
}
