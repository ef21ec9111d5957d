use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

/// A probed media file ready to be placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub media: MediaRef,
}

impl MediaItem {
    pub fn new(kind: MediaKind, media: MediaRef) -> Self {
        Self { kind, media }
    }

    pub fn duration(&self) -> TimeUs {
        self.media.source_duration
    }
}

/// Result of a batch insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub timeline: Timeline,
    /// Insertion cursor after the batch: advanced past the new video clips.
    pub insertion_time: TimeUs,
    /// Ids of the created clips, videos first, each group in input order.
    pub inserted: Vec<Uuid>,
}

impl Timeline {
    /// Ripple-insert a batch of media at `insertion_time`.
    ///
    /// Video items are laid back-to-back from the insertion point onto the
    /// video track and every video clip starting at or after that point is
    /// pushed later by their combined duration. Audio items all start at the
    /// insertion point on the first audio track, which is created if needed.
    /// The cursor only advances past the new video.
    pub fn insert_media(&self, batch: &[MediaItem], insertion_time: TimeUs) -> Insertion {
        let (usable, skipped): (Vec<&MediaItem>, Vec<&MediaItem>) =
            batch.iter().partition(|item| item.duration() > TimeUs::ZERO);
        for item in &skipped {
            tracing::warn!(name = %item.media.name, "skipping media with non-positive duration");
        }

        if usable.is_empty() {
            return Insertion {
                timeline: self.clone(),
                insertion_time,
                inserted: vec![],
            };
        }

        let at = insertion_time.max(TimeUs::ZERO);
        let videos: Vec<&MediaItem> = usable
            .iter()
            .copied()
            .filter(|i| i.kind == MediaKind::Video)
            .collect();
        let audios: Vec<&MediaItem> = usable
            .iter()
            .copied()
            .filter(|i| i.kind == MediaKind::Audio)
            .collect();

        let mut next = self.clone();
        let mut inserted = Vec::with_capacity(usable.len());
        let mut cursor_after = insertion_time;

        if !videos.is_empty() {
            let track = &mut next.tracks[self.video_track_index()];
            let at = ripple_point(&track.clips, at);
            let shift: TimeUs = videos.iter().map(|i| i.duration()).sum();

            for clip in track.clips.iter_mut().filter(|c| c.start >= at) {
                clip.start += shift;
            }

            let color_base = track.clips.len();
            let mut cursor = at;
            for (i, item) in videos.iter().enumerate() {
                let color = CLIP_COLORS[(color_base + i) % CLIP_COLORS.len()];
                let clip = media_clip(item, cursor, color);
                cursor += clip.duration;
                inserted.push(clip.id);
                track.clips.push(clip);
            }
            track.clips.sort_by(Clip::cmp_start);
            cursor_after = at + shift;
        }

        if !audios.is_empty() {
            let idx = next.ensure_track(TrackKind::Audio);
            let track = &mut next.tracks[idx];
            for item in &audios {
                let clip = media_clip(item, at, "");
                inserted.push(clip.id);
                track.clips.push(clip);
            }
            track.clips.sort_by(Clip::cmp_start);
        }

        tracing::info!(
            videos = videos.len(),
            audios = audios.len(),
            at = %at,
            "media inserted"
        );

        Insertion {
            timeline: next,
            insertion_time: cursor_after,
            inserted,
        }
    }

    /// Place a text clip on the first text track with room for its interval.
    ///
    /// Captions that would overlap one already placed go one text track
    /// further down, and a new text track is appended when none has room.
    pub fn insert_text_clip(&self, clip: Clip) -> Result<Timeline> {
        if !clip.is_text() {
            return Err(CoreError::KindMismatch {
                clip: clip.kind(),
                track: TrackKind::Text,
            });
        }
        let mut next = self.clone();
        let free = next
            .tracks
            .iter()
            .position(|t| t.kind == TrackKind::Text && !t.clips.iter().any(|c| c.overlaps(&clip)));
        let idx = match free {
            Some(idx) => idx,
            None => {
                next.tracks.push(Track::new(TrackKind::Text));
                tracing::debug!(clip_id = %clip.id, "text track added for overlapping caption");
                next.tracks.len() - 1
            }
        };
        next.tracks[idx].clips.push(clip);
        next.tracks[idx].clips.sort_by(Clip::cmp_start);
        Ok(next)
    }

    /// Move a clip between tracks (or within one), compacting both ends.
    ///
    /// Invalid requests (stale ids, cross-kind moves) leave the timeline as it
    /// was; see [`Timeline::try_relocate_clip`] for the reason.
    pub fn relocate_clip(
        &self,
        clip_id: Uuid,
        from_track: Uuid,
        to_track: Uuid,
        new_start: TimeUs,
    ) -> Timeline {
        match self.try_relocate_clip(clip_id, from_track, to_track, new_start) {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!(%clip_id, error = %e, "relocation ignored");
                self.clone()
            }
        }
    }

    /// Move a clip, reporting why an invalid request was refused.
    ///
    /// The clip leaves the source track, which is then compacted. The clip
    /// joins the destination track at `new_start`, which only decides its
    /// sort position, and the destination is compacted in turn. When source
    /// and destination are the same track the insertion sees the already
    /// compacted list.
    pub fn try_relocate_clip(
        &self,
        clip_id: Uuid,
        from_track: Uuid,
        to_track: Uuid,
        new_start: TimeUs,
    ) -> Result<Timeline> {
        let from_idx = self
            .track_index(from_track)
            .ok_or(CoreError::TrackNotFound(from_track))?;
        let to_idx = self
            .track_index(to_track)
            .ok_or(CoreError::TrackNotFound(to_track))?;

        let pos = self.tracks[from_idx]
            .clips
            .iter()
            .position(|c| c.id == clip_id)
            .ok_or(CoreError::ClipNotFound(clip_id))?;

        let clip_kind = self.tracks[from_idx].clips[pos].kind();
        let track_kind = self.tracks[to_idx].kind;
        if clip_kind != track_kind {
            return Err(CoreError::KindMismatch {
                clip: clip_kind,
                track: track_kind,
            });
        }

        let mut next = self.clone();
        let mut moved = next.tracks[from_idx].clips.remove(pos);
        compact(&mut next.tracks[from_idx].clips);

        moved.start = new_start;
        next.tracks[to_idx].clips.push(moved);
        compact(&mut next.tracks[to_idx].clips);

        tracing::debug!(%clip_id, %from_track, %to_track, "clip relocated");
        Ok(next)
    }
}

/// Sort clips by start, then pack them back-to-back from zero.
pub fn compact(clips: &mut [Clip]) {
    clips.sort_by(Clip::cmp_start);
    let mut cursor = TimeUs::ZERO;
    for clip in clips.iter_mut() {
        clip.start = cursor;
        cursor += clip.duration;
    }
}

/// Where a ripple insert at `at` really lands: the end of the clip `at`
/// falls strictly inside, or `at` itself.
fn ripple_point(clips: &[Clip], at: TimeUs) -> TimeUs {
    clips
        .iter()
        .find(|c| c.start < at && at < c.end())
        .map(Clip::end)
        .unwrap_or(at)
}

/// Build the clip for an already validated media item.
fn media_clip(item: &MediaItem, start: TimeUs, color: &str) -> Clip {
    let content = match item.kind {
        MediaKind::Video => ClipContent::Video {
            media: item.media.clone(),
            color: color.to_string(),
        },
        MediaKind::Audio => ClipContent::Audio {
            media: item.media.clone(),
        },
    };
    Clip {
        id: Uuid::new_v4(),
        start,
        duration: item.duration(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    fn assert_compacted(track: &Track) {
        let mut expected = TimeUs::ZERO;
        for clip in track.clips() {
            assert_eq!(clip.start, expected, "track {} has a gap or overlap", track.id);
            expected += clip.duration;
        }
    }

    fn assert_well_formed(tl: &Timeline) {
        tl.check_invariants().unwrap();
        for track in tl.tracks() {
            assert!(track.is_non_overlapping(), "track {} overlaps", track.id);
        }
    }

    // -----------------------------------------------------------------------
    // insert_media
    // -----------------------------------------------------------------------

    #[test]
    fn scenario_a_first_video_clip() {
        let tl = Timeline::new();
        let ins = tl.insert_media(&[video_item("a.mp4", 10.0)], TimeUs::ZERO);

        assert_eq!(layout(ins.timeline.video_track()), vec![(0.0, 10.0)]);
        assert_eq!(ins.timeline.total_duration(), secs(10.0));
        assert_eq!(ins.insertion_time, secs(10.0));
        assert_eq!(ins.inserted.len(), 1);
    }

    #[test]
    fn scenario_b_ripple_insert_at_zero() {
        let a = Timeline::new().insert_media(&[video_item("a.mp4", 10.0)], TimeUs::ZERO);
        let original_id = a.inserted[0];

        let b = a.timeline.insert_media(&[video_item("b.mp4", 5.0)], TimeUs::ZERO);
        let video = b.timeline.video_track();

        assert_eq!(layout(video), vec![(0.0, 5.0), (5.0, 10.0)]);
        assert_eq!(video.clips()[0].id, b.inserted[0]);
        assert_eq!(video.clips()[1].id, original_id);
        assert_eq!(b.timeline.total_duration(), secs(15.0));
        assert_eq!(b.insertion_time, secs(5.0));
    }

    #[test]
    fn batch_videos_are_sequenced_in_input_order() {
        let ins = Timeline::new().insert_media(
            &[
                video_item("a.mp4", 3.0),
                video_item("b.mp4", 2.0),
                video_item("c.mp4", 4.0),
            ],
            TimeUs::ZERO,
        );
        let video = ins.timeline.video_track();
        assert_eq!(layout(video), vec![(0.0, 3.0), (3.0, 2.0), (5.0, 4.0)]);
        let names: Vec<&str> = video
            .clips()
            .iter()
            .map(|c| c.media().unwrap().name.as_str())
            .collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(ins.insertion_time, secs(9.0));
    }

    #[test]
    fn append_grows_duration_by_batch_total() {
        let base = Timeline::new()
            .insert_media(&[video_item("a.mp4", 7.5)], TimeUs::ZERO)
            .timeline;
        let before = base.total_duration();

        let ins = base.insert_media(
            &[video_item("b.mp4", 2.0), video_item("c.mp4", 1.25)],
            before,
        );
        assert_eq!(ins.timeline.total_duration(), before + secs(3.25));
        assert_well_formed(&ins.timeline);
    }

    #[test]
    fn clips_before_insertion_point_are_untouched() {
        let base = Timeline::new()
            .insert_media(
                &[video_item("a.mp4", 4.0), video_item("b.mp4", 6.0)],
                TimeUs::ZERO,
            )
            .timeline;

        let ins = base.insert_media(&[video_item("c.mp4", 2.0)], secs(4.0));
        assert_eq!(
            layout(ins.timeline.video_track()),
            vec![(0.0, 4.0), (4.0, 2.0), (6.0, 6.0)]
        );
        assert_eq!(ins.insertion_time, secs(6.0));
        assert_well_formed(&ins.timeline);
    }

    #[test]
    fn insertion_inside_a_clip_lands_at_its_end() {
        let base = Timeline::new()
            .insert_media(
                &[video_item("a.mp4", 10.0), video_item("b.mp4", 5.0)],
                TimeUs::ZERO,
            )
            .timeline;

        let ins = base.insert_media(&[video_item("c.mp4", 3.0)], secs(4.0));
        assert_eq!(
            layout(ins.timeline.video_track()),
            vec![(0.0, 10.0), (10.0, 3.0), (13.0, 5.0)]
        );
        assert_eq!(ins.insertion_time, secs(13.0));
        assert_well_formed(&ins.timeline);
    }

    #[test]
    fn audio_stacks_at_insertion_point_on_new_track() {
        let base = Timeline::new()
            .insert_media(&[video_item("a.mp4", 20.0)], TimeUs::ZERO)
            .timeline;

        let ins = base.insert_media(
            &[audio_item("music.mp3", 8.0), audio_item("voice.wav", 3.0)],
            secs(5.0),
        );
        let audio = ins.timeline.first_track_of(TrackKind::Audio).unwrap();
        assert_eq!(layout(audio), vec![(5.0, 8.0), (5.0, 3.0)]);
        // audio does not move the cursor or the video
        assert_eq!(ins.insertion_time, secs(5.0));
        assert_eq!(ins.timeline.total_duration(), secs(20.0));
        assert_eq!(ins.timeline.tracks().len(), 2);
    }

    #[test]
    fn audio_reuses_first_audio_track() {
        let (tl, first_audio) = Timeline::new().with_track(TrackKind::Audio).unwrap();
        let (tl, _second_audio) = tl.with_track(TrackKind::Audio).unwrap();

        let ins = tl.insert_media(&[audio_item("a.wav", 2.0)], TimeUs::ZERO);
        assert_eq!(ins.timeline.tracks().len(), 3);
        assert_eq!(ins.timeline.track(first_audio).unwrap().clips().len(), 1);
    }

    #[test]
    fn mixed_batch_places_each_kind() {
        let ins = Timeline::new().insert_media(
            &[
                audio_item("music.mp3", 30.0),
                video_item("a.mp4", 4.0),
                video_item("b.mp4", 4.0),
            ],
            TimeUs::ZERO,
        );
        assert_eq!(layout(ins.timeline.video_track()), vec![(0.0, 4.0), (4.0, 4.0)]);
        let audio = ins.timeline.first_track_of(TrackKind::Audio).unwrap();
        assert_eq!(layout(audio), vec![(0.0, 30.0)]);
        assert_eq!(ins.insertion_time, secs(8.0));
        assert_eq!(ins.inserted.len(), 3);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let base = Timeline::new()
            .insert_media(&[video_item("a.mp4", 5.0)], TimeUs::ZERO)
            .timeline;
        let ins = base.insert_media(&[], secs(2.0));
        assert_eq!(ins.timeline, base);
        assert_eq!(ins.insertion_time, secs(2.0));
        assert!(ins.inserted.is_empty());
    }

    #[test]
    fn zero_duration_items_are_skipped() {
        let ins = Timeline::new().insert_media(
            &[video_item("broken.mp4", 0.0), video_item("ok.mp4", 2.0)],
            TimeUs::ZERO,
        );
        assert_eq!(layout(ins.timeline.video_track()), vec![(0.0, 2.0)]);
        assert_eq!(ins.inserted.len(), 1);
    }

    #[test]
    fn video_colors_cycle_through_palette() {
        let items: Vec<MediaItem> = (0..6).map(|i| video_item(&format!("{i}.mp4"), 1.0)).collect();
        let ins = Timeline::new().insert_media(&items, TimeUs::ZERO);
        let colors: Vec<&str> = ins
            .timeline
            .video_track()
            .clips()
            .iter()
            .map(|c| match &c.content {
                ClipContent::Video { color, .. } => color.as_str(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(colors[..5], CLIP_COLORS[..]);
        assert_eq!(colors[5], CLIP_COLORS[0]);
    }

    #[test]
    fn insert_text_clip_creates_text_track() {
        let tl = Timeline::new();
        let clip = text_clip(3.0, 4.0);
        let clip_id = clip.id;
        let next = tl.insert_text_clip(clip).unwrap();
        let text = next.first_track_of(TrackKind::Text).unwrap();
        assert_eq!(text.clips()[0].id, clip_id);

        let err = tl.insert_text_clip(audio_clip(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, CoreError::KindMismatch { .. }));
    }

    #[test]
    fn overlapping_text_clips_spread_over_text_tracks() {
        let first = text_clip(2.0, 4.0);
        let overlapping = text_clip(3.0, 4.0);
        let later = text_clip(6.0, 1.0);
        let (a, b, c) = (first.id, overlapping.id, later.id);

        let tl = Timeline::new()
            .insert_text_clip(first)
            .and_then(|tl| tl.insert_text_clip(overlapping))
            .and_then(|tl| tl.insert_text_clip(later))
            .unwrap();

        let text: Vec<&Track> = tl.tracks().iter().filter(|t| t.kind == TrackKind::Text).collect();
        assert_eq!(text.len(), 2);
        assert!(text[0].clip(a).is_some());
        assert!(text[1].clip(b).is_some());
        // the first track has room again once the caption there has ended
        assert!(text[0].clip(c).is_some());
        assert_well_formed(&tl);
    }

    // -----------------------------------------------------------------------
    // relocate_clip
    // -----------------------------------------------------------------------

    fn two_video_clips() -> (Timeline, Uuid, Uuid, Uuid) {
        let first = video_clip(0.0, 5.0);
        let second = video_clip(5.0, 5.0);
        let (a, b) = (first.id, second.id);
        let video = Track::with_clips(TrackKind::Video, vec![first, second]).unwrap();
        let video_id = video.id;
        (Timeline::from_tracks(vec![video]).unwrap(), video_id, a, b)
    }

    #[test]
    fn scenario_c_same_track_move_past_end() {
        let (tl, video_id, a, b) = two_video_clips();
        let next = tl.relocate_clip(b, video_id, video_id, secs(100.0));

        let video = next.video_track();
        assert_eq!(layout(video), vec![(0.0, 5.0), (5.0, 5.0)]);
        assert_eq!(video.clips()[0].id, a);
        assert_eq!(video.clips()[1].id, b);
        assert_eq!(next.total_duration(), secs(10.0));
    }

    #[test]
    fn same_track_move_to_front_reorders() {
        let (tl, video_id, a, b) = two_video_clips();
        let next = tl.relocate_clip(b, video_id, video_id, TimeUs::ZERO);
        let ids: Vec<Uuid> = next.video_track().clips().iter().map(|c| c.id).collect();
        // equal starts keep the remaining clip first
        assert_eq!(ids, vec![a, b]);

        let before_a = video_clip(0.0, 2.0);
        let c = before_a.id;
        let video = Track::with_clips(
            TrackKind::Video,
            vec![video_clip(0.0, 5.0), video_clip(5.0, 5.0), {
                let mut clip = before_a;
                clip.start = secs(10.0);
                clip
            }],
        )
        .unwrap();
        let video_id = video.id;
        let tl = Timeline::from_tracks(vec![video]).unwrap();
        let next = tl.try_relocate_clip(c, video_id, video_id, secs(4.0)).unwrap();
        assert_eq!(layout(next.video_track()), vec![(0.0, 5.0), (5.0, 2.0), (7.0, 5.0)]);
        assert_eq!(next.video_track().clips()[1].id, c);
    }

    #[test]
    fn cross_track_move_compacts_both_tracks() {
        let a1 = audio_clip(0.0, 2.0);
        let a2 = audio_clip(4.0, 3.0);
        let a3 = audio_clip(10.0, 1.0);
        let moving = a2.id;
        let src = Track::with_clips(TrackKind::Audio, vec![a1, a2, a3]).unwrap();
        let dst = Track::with_clips(
            TrackKind::Audio,
            vec![audio_clip(1.0, 4.0), audio_clip(20.0, 2.0)],
        )
        .unwrap();
        let (src_id, dst_id) = (src.id, dst.id);
        let tl = Timeline::from_tracks(vec![Track::new(TrackKind::Video), src, dst]).unwrap();

        let next = tl.try_relocate_clip(moving, src_id, dst_id, secs(6.0)).unwrap();
        let src = next.track(src_id).unwrap();
        let dst = next.track(dst_id).unwrap();

        assert_eq!(layout(src), vec![(0.0, 2.0), (2.0, 1.0)]);
        assert_eq!(layout(dst), vec![(0.0, 4.0), (4.0, 3.0), (7.0, 2.0)]);
        assert_eq!(dst.clips()[1].id, moving);
        assert!(src.clip(moving).is_none());
        assert_compacted(src);
        assert_compacted(dst);
        assert_well_formed(&next);
    }

    #[test]
    fn moving_text_to_another_text_track() {
        let t1 = text_clip(0.0, 4.0);
        let moving = t1.id;
        let src = Track::with_clips(TrackKind::Text, vec![t1, text_clip(8.0, 2.0)]).unwrap();
        let dst = Track::new(TrackKind::Text);
        let (src_id, dst_id) = (src.id, dst.id);
        let tl = Timeline::from_tracks(vec![Track::new(TrackKind::Video), src, dst]).unwrap();

        let next = tl.relocate_clip(moving, src_id, dst_id, secs(12.0));
        assert_eq!(layout(next.track(src_id).unwrap()), vec![(0.0, 2.0)]);
        assert_eq!(layout(next.track(dst_id).unwrap()), vec![(0.0, 4.0)]);
    }

    #[test]
    fn cross_kind_relocation_is_a_no_op() {
        let audio = Track::with_clips(TrackKind::Audio, vec![audio_clip(0.0, 3.0)]).unwrap();
        let clip_id = audio.clips()[0].id;
        let audio_id = audio.id;
        let text = Track::with_clips(TrackKind::Text, vec![text_clip(0.0, 1.0)]).unwrap();
        let text_id = text.id;
        let tl = Timeline::from_tracks(vec![Track::new(TrackKind::Video), audio, text]).unwrap();

        let next = tl.relocate_clip(clip_id, audio_id, text_id, secs(1.0));
        assert_eq!(next, tl);

        let err = tl
            .try_relocate_clip(clip_id, audio_id, text_id, secs(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::KindMismatch {
                clip: TrackKind::Audio,
                track: TrackKind::Text
            }
        ));
    }

    #[test]
    fn stale_ids_are_no_ops() {
        let (tl, video_id, a, _) = two_video_clips();
        let ghost = Uuid::new_v4();

        assert_eq!(tl.relocate_clip(ghost, video_id, video_id, TimeUs::ZERO), tl);
        assert_eq!(tl.relocate_clip(a, ghost, video_id, TimeUs::ZERO), tl);
        assert_eq!(tl.relocate_clip(a, video_id, ghost, TimeUs::ZERO), tl);

        assert!(matches!(
            tl.try_relocate_clip(ghost, video_id, video_id, TimeUs::ZERO),
            Err(CoreError::ClipNotFound(_))
        ));
        assert!(matches!(
            tl.try_relocate_clip(a, ghost, video_id, TimeUs::ZERO),
            Err(CoreError::TrackNotFound(_))
        ));
    }

    #[test]
    fn clip_must_be_on_the_named_source_track() {
        let audio = Track::with_clips(TrackKind::Audio, vec![audio_clip(0.0, 3.0)]).unwrap();
        let other = Track::new(TrackKind::Audio);
        let clip_id = audio.clips()[0].id;
        let other_id = other.id;
        let tl = Timeline::from_tracks(vec![Track::new(TrackKind::Video), audio, other]).unwrap();

        assert!(matches!(
            tl.try_relocate_clip(clip_id, other_id, other_id, TimeUs::ZERO),
            Err(CoreError::ClipNotFound(_))
        ));
    }

    #[test]
    fn relocation_removes_gaps_and_overlaps() {
        // stacked audio from an import overlaps until something is moved
        let ins = Timeline::new().insert_media(
            &[
                audio_item("a.wav", 4.0),
                audio_item("b.wav", 2.0),
                audio_item("c.wav", 3.0),
            ],
            secs(6.0),
        );
        let audio_id = ins.timeline.first_track_of(TrackKind::Audio).unwrap().id;
        let moving = ins.inserted[1];

        let next = ins.timeline.relocate_clip(moving, audio_id, audio_id, secs(50.0));
        let audio = next.track(audio_id).unwrap();
        assert_compacted(audio);
        assert!(audio.is_non_overlapping());
        assert_eq!(audio.clips().last().unwrap().id, moving);
        assert_eq!(audio.end(), secs(9.0));
    }

    #[test]
    fn repeated_moves_keep_video_packed() {
        let ins = Timeline::new().insert_media(
            &[
                video_item("a.mp4", 1.0),
                video_item("b.mp4", 2.0),
                video_item("c.mp4", 3.0),
                video_item("d.mp4", 4.0),
            ],
            TimeUs::ZERO,
        );
        let video_id = ins.timeline.video_track().id;
        let mut tl = ins.timeline;
        for (i, id) in ins.inserted.iter().enumerate() {
            tl = tl.relocate_clip(*id, video_id, video_id, secs(i as f64 * 2.5));
            assert_compacted(tl.video_track());
            assert_well_formed(&tl);
            assert_eq!(tl.total_duration(), secs(10.0));
        }
    }

    #[test]
    fn compact_sorts_then_packs() {
        let mut clips = vec![text_clip(9.0, 1.0), text_clip(2.0, 3.0), text_clip(2.5, 2.0)];
        let order: Vec<Uuid> = vec![clips[1].id, clips[2].id, clips[0].id];
        compact(&mut clips);
        let ids: Vec<Uuid> = clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, order);
        let starts: Vec<TimeUs> = clips.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![TimeUs::ZERO, secs(3.0), secs(5.0)]);
    }
}
