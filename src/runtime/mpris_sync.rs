use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let track = app
        .snapshot
        .as_ref()
        .and_then(|h| h.lock().ok().and_then(|s| s.track.clone()));

    let index = track
        .as_ref()
        .and_then(|t| app.tracks.iter().position(|x| x.id == t.id));
    mpris.set_track_metadata(index, track.as_deref());
    mpris.set_playback(app.status);
}
